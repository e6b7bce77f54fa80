mod environment;
mod manifest;
mod target;

pub use environment::Environment;
pub use manifest::Manifest;
pub use target::Target;
