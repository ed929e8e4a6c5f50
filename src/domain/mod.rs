//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Rich domain types (validated, ready for the window and renderer)
//! - `wire.rs`: Raw serde structs matching feed payloads
//! - `convert.rs`: `TryFrom` conversions with validation, message formatters
//! - `client.rs`: Sub-client with HTTP methods

pub mod price;
