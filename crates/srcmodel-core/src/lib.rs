//! Core types for the srcmodel extraction engine.
//!
//! Provides the normalized entity model ([`model::ParseResult`] and the
//! [`model::Symbol`] / [`model::Import`] / [`model::Inheritance`] /
//! [`model::Call`] records it holds), the per-file error taxonomy, project
//! configuration, and JSON persistence.

pub mod config;
pub mod error;
pub mod model;
pub mod schema;

pub use error::ParseError;
pub use model::{
    Annotation, Call, CallType, Import, Inheritance, MODULE_SCOPE, ParseResult, ParseStats,
    Symbol, SymbolKind,
};
