pub mod entry_sequence;
pub mod log_file;

pub use entry_sequence::EntrySequence;
pub use log_file::LogFileLoader;
