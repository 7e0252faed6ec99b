pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod reader;
pub mod resolver;
pub mod server;
pub mod tracker;
pub mod types;
pub mod utils;


// Re-export commonly used item
pub use error::{TallyError, TallyResult};
