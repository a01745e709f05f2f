//! Typed shim generator for Wayland protocols.
//!
//! schema (XML/JSON) → [`schema::ProtocolTree`] → [`transcribe`] →
//! [`ir::Protocol`] → three rendered C++ artifacts.
pub mod cli;
pub mod error;
pub mod generate;
pub mod ir;
pub mod naming;
pub mod render;
pub mod schema;
pub mod transcribe;
pub mod types;

pub use error::{GenError, SchemaError};
pub use ir::Protocol;
pub use transcribe::transcribe;
