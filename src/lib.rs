pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod optimizer;
pub mod session;

mod utils;

pub use error::{OptimizerError, SqlPilotError};
