//! # Schema Errors — Bad Authoring Fails Loudly
//!
//! Errors in this module describe mistakes in schema construction or
//! resolution. They are raised to the schema author as hard failures and
//! are never downgraded to reports; findings about the input document live
//! in `jsonvet-report` instead.

use thiserror::Error;

use crate::registry::SchemaId;

/// Error in schema authoring or self-reference resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A child was added to a structure that does not accept objects.
    #[error("cannot add children to a structure that does not accept objects")]
    ChildrenOnNonObject,

    /// An element was added to a structure that does not accept arrays.
    #[error("cannot add elements to a structure that does not accept arrays")]
    ElementsOnNonArray,

    /// A branch candidate has no key and is not itself a branch holder.
    #[error("a branch candidate must have a key or be a branch holder itself")]
    BranchCandidateWithoutKey,

    /// A structure was marked as a branch holder but carries no branch.
    #[error("a branch holder must carry a branch")]
    BranchHolderWithoutBranch,

    /// The identity is already registered.
    #[error("identity {0} is already registered")]
    DuplicateIdentity(SchemaId),

    /// No structure is registered under the identity.
    #[error("no structure is registered under identity {0}")]
    UnknownIdentity(SchemaId),

    /// The ancestor walk reached the root without a match.
    #[error("could not locate ancestor {0} on the parent chain")]
    UnknownAncestor(SchemaId),

    /// A value set meant to hold scalars was given something else.
    #[error("expected values must be scalar, got a value of type \"{actual}\"")]
    NonScalarValue {
        /// Rendered datatype of the offending value.
        actual: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_identity_message_names_the_id() {
        let id = SchemaId::new();
        let message = SchemaError::UnknownIdentity(id).to_string();
        assert!(message.contains(&id.to_string()));
    }
}
