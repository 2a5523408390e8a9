//! # Accessor Errors
//!
//! Outcomes of document field/element access. These are ordinary values,
//! not control flow: the comparison layer matches on them to decide between
//! "optional field is absent" and "report a conformance problem".

use thiserror::Error;

/// Error produced while accessing a decoded document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The requested field does not exist on the object.
    #[error("cannot find field \"{key}\"")]
    NotFound {
        /// The field that was requested.
        key: String,
    },

    /// The requested index does not exist in the array.
    #[error("cannot find index {index} within array \"{key}\"")]
    NoSuchIndex {
        /// The index that was requested.
        index: usize,
        /// The key of the array, or `(root)` when keyless.
        key: String,
    },

    /// The value at this position is not of the type the access requires.
    #[error("cannot get {subject} because the value is of type \"{actual}\" instead of the expected type \"{expected}\"")]
    WrongType {
        /// What was being accessed, e.g. `field "name"` or `keys`.
        subject: String,
        /// Rendered list of acceptable datatypes.
        expected: String,
        /// Rendered list of the actual datatype.
        actual: String,
    },

    /// The raw text could not be parsed as JSON.
    #[error("parse error at line {line}, column {column}: {reason}")]
    Parse {
        /// Parser-reported reason.
        reason: String,
        /// 1-based line of the syntax error.
        line: usize,
        /// 1-based column of the syntax error.
        column: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DocumentError::NotFound { key: "name".into() };
        assert_eq!(err.to_string(), "cannot find field \"name\"");
    }

    #[test]
    fn test_wrong_type_message() {
        let err = DocumentError::WrongType {
            subject: "field \"age\"".into(),
            expected: "integer".into(),
            actual: "string".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot get field \"age\" because the value is of type \"string\" instead of the expected type \"integer\""
        );
    }
}
