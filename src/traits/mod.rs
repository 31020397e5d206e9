//! Core traits for the container.

pub mod resolver;
pub mod source;

pub use resolver::Resolver;
pub use source::TypeSource;
