pub mod config;
pub mod diff;
pub mod error;
pub mod score;
pub mod types;

pub use config::DictaConfig;
pub use diff::{DiffSpan, SpanKind};
pub use error::{DictaError, Result};
pub use types::*;
