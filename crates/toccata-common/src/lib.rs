pub mod errors;
pub mod manifest;
pub mod source;

pub use errors::{Result, ScriptError};
pub use source::SourceRef;
