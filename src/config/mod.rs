//! Configuration for spritepack
//!
//! Provides types, discovery and parsing for `spritepack.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
