pub mod artifact;
pub mod extract;
pub mod host;
pub mod resolve;

pub use artifact::Artifact;
pub use extract::extract;
pub use host::{Compiler, LoadContext, ModuleLoader};
pub use resolve::Resolver;
