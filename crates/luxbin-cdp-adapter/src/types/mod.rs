/*
[INPUT]:  CDP API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

pub mod case;
pub mod onramp;
pub mod webhook;

pub use case::{camelize_keys, snakify_keys, to_camel_case, to_snake_case};
pub use onramp::*;
pub use webhook::*;
