//! Utility modules

pub mod locks;
pub mod memory_store;
pub mod validation;

pub use locks::*;
pub use memory_store::*;
pub use validation::*;
