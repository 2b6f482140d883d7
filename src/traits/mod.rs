//! Core traits for resolving from the object graph.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
