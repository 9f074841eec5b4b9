mod optimizer;
mod sqlpilot;

pub use optimizer::OptimizerError;
pub use sqlpilot::SqlPilotError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
