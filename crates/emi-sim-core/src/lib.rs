pub mod amortization;
pub mod error;
pub mod store;
pub mod types;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(feature = "advisory")]
pub mod advisory;

#[cfg(feature = "advisory")]
pub mod analysis;

pub use error::LoanEngineError;
pub use types::*;

/// Standard result type for all engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
