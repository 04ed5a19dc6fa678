//! Helper functions shared by rendering code

mod date;

pub use date::*;
