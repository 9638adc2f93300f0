//! Extractors that answer with the shared [`ErrorResponse`](crate::errors::ErrorResponse) shape.

pub mod uuid_path;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
