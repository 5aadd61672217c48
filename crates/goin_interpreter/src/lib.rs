mod environment;
pub mod error;
pub mod evaluator;
pub mod object;

pub use environment::Environment;
pub use error::RuntimeError;
pub use evaluator::{eval, Evaluator};
