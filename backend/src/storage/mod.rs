//! Storage layer: abstraction traits plus the JSON document store backing
//! the member and suggestion collections.

pub mod json;
pub mod traits;

pub use json::JsonConnection;
pub use traits::*;
