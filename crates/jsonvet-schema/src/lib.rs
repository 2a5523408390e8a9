//! # jsonvet-schema — Schema Model and Comparison Engine
//!
//! A schema is a tree of [`Structure`] values describing the expected
//! shape at each position of a document: expected datatypes, required and
//! optional fields, wildcard ("placeholder") keys, predicate-gated
//! conditional sub-schemas ("branches"), and self-references by ancestor
//! walk or registry identity. Comparing a schema against a
//! [`jsonvet_core::Node`] walks both trees in lock-step and emits a
//! [`jsonvet_report::ReportTree`].
//!
//! ## Key Design Principles
//!
//! 1. **Two error universes.** Bad schema authoring is a hard
//!    [`SchemaError`]; nothing about the input document ever raises — data
//!    findings are always reports.
//!
//! 2. **Schemas are immutable during use.** Placeholder, ancestor, and
//!    redirect expansion operate on disposable per-call clones; audits
//!    mutate a per-visit copy of the options. Comparing the same schema
//!    forest concurrently is safe.
//!
//! 3. **Caller-owned identity registry.** Self-references resolve through
//!    an explicit [`SchemaRegistry`] value, populated before comparison
//!    and read-only during it. No process-wide state.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod audit;
pub mod branch;
pub mod compare;
pub mod condition;
pub mod error;
pub mod options;
pub mod predicate;
pub mod registry;
pub mod structure;

pub use audit::{Audit, SiblingValueMatches, ValueMatches};
pub use branch::Branch;
pub use condition::{
    AtLeastOneKey, AtLeastOneValidKey, CannotHaveValue, Condition, ExclusiveKeys, FailWithMessage,
    KeyHasValue, KeyIsType, KeysExist, WithinRange,
};
pub use error::SchemaError;
pub use options::{Options, OptionsBuilder};
pub use predicate::{AlwaysFalse, AlwaysTrue, HasDatatype, HasValue, Predicate, SiblingHasValue};
pub use registry::{SchemaId, SchemaRegistry};
pub use structure::{GuardedAudit, Structure};
