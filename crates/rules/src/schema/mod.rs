//! Rule Set schema types with serde (de)serialization.
//!
//! Defines:
//! - `Rule`: one user-defined matching/rendering rule
//! - `TitleOptions`: per-rule output styling (prefix flag, colours, gradient)
//! - `TitlePayload`: the data contract handed to the title sink

mod rule;
mod title;

pub use rule::*;
pub use title::*;
