//! # jsonvet-core — Document Model for the jsonvet Engine
//!
//! This crate is the leaf of the jsonvet workspace. It wraps an
//! already-decoded JSON tree (a `serde_json::Value`) in typed position
//! handles that the schema-comparison layer walks in lock-step with a
//! schema tree. It knows nothing about schemas or reports.
//!
//! ## Key Design Principles
//!
//! 1. **Bitmask datatypes.** Every position carries a [`Datatype`] derived
//!    from its runtime value at construction. Composite masks (`NUMBER`,
//!    `SCALAR`, `ANY`) make "integer or double" a single bit test rather
//!    than a special case.
//!
//! 2. **Borrowed positions, owned keys.** A [`Node`] borrows the decoded
//!    value and is created lazily while descending; the document itself is
//!    never copied or mutated.
//!
//! 3. **`Result` at the accessor boundary.** Field and element lookups
//!    return [`DocumentError`] outcomes. Callers branch on the outcome;
//!    nothing unwinds across layers to signal "absent" or "malformed".
//!
//! 4. **Upward-only parent chain.** A node holds a reference to the parent
//!    it was created from, never to its children, so the chain is acyclic
//!    by construction.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsonvet-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod datatype;
pub mod error;
pub mod node;
pub mod nodeset;

pub use datatype::Datatype;
pub use error::DocumentError;
pub use node::{parse_document, Node};
pub use nodeset::NodeSet;
