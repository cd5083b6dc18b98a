//! Interoperability with external schema formats.

mod json_schema;

pub use json_schema::to_json_schema;
