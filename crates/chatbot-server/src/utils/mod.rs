pub mod error;

pub use error::{with_timeout, ApiError, PipelineError, Stage, StoreError};
