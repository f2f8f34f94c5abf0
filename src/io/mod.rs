pub mod config_io;
pub mod exchange;
pub mod snapshot;
pub mod storage;
