pub mod board;
pub mod task;
pub mod forest;
pub mod config;

pub use board::*;
pub use task::*;
pub use forest::*;
pub use config::*;
