//! # Conditions — Schema-Aware Tests with Standardized Reporting
//!
//! A condition is a test that knows the owning structure, so it can format
//! structure-specific diagnostics. The `announce` flag separates "just
//! test" (branch gating) from "test and report" (direct attachment to a
//! structure).

use std::fmt;

use jsonvet_core::{Datatype, Node};
use jsonvet_report::{Report, ReportTree};
use serde_json::Value;

use crate::error::SchemaError;
use crate::structure::Structure;

/// A test with structural context and standardized error reporting.
pub trait Condition: fmt::Debug + Send + Sync {
    /// Test the node in the context of its owning structure. With
    /// `announce` set, failures are added to the reports; without it the
    /// call only answers the question.
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool;
}

fn quoted_key(structure: &Structure) -> String {
    Report::keys([structure.key().unwrap_or("(root)")])
}

/// Ensure a value set holds only scalars, for conditions that compare
/// against literal values.
fn require_scalars(values: &[Value]) -> Result<(), SchemaError> {
    for value in values {
        let datatype = Datatype::of(value);
        if !datatype.intersects(Datatype::SCALAR) {
            return Err(SchemaError::NonScalarValue {
                actual: datatype.to_string(),
            });
        }
    }
    Ok(())
}

fn render_values(values: &[Value]) -> String {
    Report::values(values.iter().map(Value::to_string))
}

/// The object must contain at least one key, valid or not.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeastOneKey;

impl Condition for AtLeastOneKey {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let Ok(keys) = node.get_keys() else {
            // Not an object; the datatype check reports that separately.
            return false;
        };
        if keys.is_empty() {
            if announce {
                reports.push(
                    Report::fatal(
                        "You must have at least one key within {}",
                        vec![quoted_key(structure)],
                    )
                    .with_context(node.clone()),
                );
            }
            return false;
        }
        true
    }
}

/// The object must contain at least one of the structure's valid keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeastOneValidKey;

impl Condition for AtLeastOneValidKey {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let valid_keys = structure.valid_keys();
        if valid_keys.iter().any(|key| node.has_field(key)) {
            return true;
        }
        if announce {
            reports.push(
                Report::fatal(
                    "You must have at least one of the following keys: {}",
                    vec![Report::keys(&valid_keys)],
                )
                .with_context(node.clone()),
            );
        }
        false
    }
}

/// A set of sibling keys that cannot coexist, optionally requiring one of
/// them to be present.
#[derive(Debug, Clone)]
pub struct ExclusiveKeys {
    at_least_one_required: bool,
    keys: Vec<String>,
}

impl ExclusiveKeys {
    /// Declare the keys mutually exclusive. With `at_least_one_required`,
    /// the absence of all of them is fatal too.
    pub fn new(at_least_one_required: bool, keys: Vec<String>) -> Self {
        Self {
            at_least_one_required,
            keys,
        }
    }
}

impl Condition for ExclusiveKeys {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        _structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let present: Vec<&str> = self
            .keys
            .iter()
            .filter(|key| node.has_field(key))
            .map(String::as_str)
            .collect();

        if present.is_empty() && self.at_least_one_required {
            if announce {
                reports.push(
                    Report::fatal(
                        "You must have one of the following keys: {}",
                        vec![Report::keys(&self.keys)],
                    )
                    .with_context(node.clone()),
                );
            }
            return false;
        }

        if present.len() > 1 {
            if announce {
                reports.push(
                    Report::fatal(
                        "Conflicting keys specified: {}. You cannot have more than one of the following keys together: {}",
                        vec![Report::keys(&present), Report::keys(&self.keys)],
                    )
                    .with_context(node.clone()),
                );
            }
            return false;
        }

        true
    }
}

/// All of the named sibling keys must exist.
#[derive(Debug, Clone)]
pub struct KeysExist {
    keys: Vec<String>,
}

impl KeysExist {
    /// Require every one of the given keys.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }
}

impl Condition for KeysExist {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        _structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let missing: Vec<&str> = self
            .keys
            .iter()
            .filter(|key| !node.has_field(key))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            return true;
        }
        if announce {
            reports.push(
                Report::fatal(
                    "Missing required keys: {}",
                    vec![Report::keys(&missing)],
                )
                .with_context(node.clone()),
            );
        }
        false
    }
}

/// A named field must have one of the stored scalar values.
#[derive(Debug, Clone)]
pub struct KeyHasValue {
    key: String,
    values: Vec<Value>,
}

impl KeyHasValue {
    /// Expect the named field to have one of the given scalar values.
    ///
    /// # Errors
    ///
    /// `NonScalarValue` when any expected value is an array, object, or null.
    pub fn new(key: impl Into<String>, values: Vec<Value>) -> Result<Self, SchemaError> {
        require_scalars(&values)?;
        Ok(Self {
            key: key.into(),
            values,
        })
    }
}

impl Condition for KeyHasValue {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        _structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let Ok(field) = node.get_field(&self.key) else {
            return false;
        };
        if !field.is_type(Datatype::SCALAR) {
            return false;
        }
        if !self.values.contains(field.value()) {
            if announce {
                reports.push(
                    Report::warning(
                        "Value {} is not valid. Must be one of: {}",
                        vec![field.render(), render_values(&self.values)],
                    )
                    .with_context(field),
                );
            }
            return false;
        }
        true
    }
}

/// A field's datatype must overlap an expected mask.
#[derive(Debug, Clone)]
pub struct KeyIsType {
    datatype: Datatype,
    key: Option<String>,
}

impl KeyIsType {
    /// Expect the named field — or, when `key` is `None`, the field named
    /// by the owning structure — to overlap the datatype mask.
    pub fn new(datatype: Datatype, key: Option<String>) -> Self {
        Self { datatype, key }
    }
}

impl Condition for KeyIsType {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let Some(key) = self.key.as_deref().or(structure.key()) else {
            return false;
        };
        let Ok(field) = node.get_field(key) else {
            return false;
        };
        if field.is_type(self.datatype) {
            return true;
        }
        if announce {
            reports.push(
                Report::fatal(
                    "Key {} does not match the expected type {}",
                    vec![Report::keys([key]), Report::keys(self.datatype.names())],
                )
                .with_context(field),
            );
        }
        false
    }
}

/// The node's numeric value must fall within an optionally open-ended
/// range.
#[derive(Debug, Clone, Copy)]
pub struct WithinRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl WithinRange {
    /// Accept numbers between `min` and `max`, either bound optional.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    fn bound_label(bound: Option<f64>, fallback: &str) -> String {
        bound.map_or_else(|| fallback.to_string(), |b| b.to_string())
    }
}

impl Condition for WithinRange {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        _structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let value = node.value().as_f64();
        let in_range = value.is_some_and(|v| {
            self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
        });
        if in_range {
            return true;
        }
        if announce {
            reports.push(
                Report::warning(
                    "Value {} is out of range; must be a number between {} and {}",
                    vec![
                        node.render(),
                        Self::bound_label(self.min, "-infinity"),
                        Self::bound_label(self.max, "+infinity"),
                    ],
                )
                .with_context(node.clone()),
            );
        }
        false
    }
}

/// Always fails, reporting the supplied message.
#[derive(Debug, Clone)]
pub struct FailWithMessage {
    message: String,
}

impl FailWithMessage {
    /// Fail with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Condition for FailWithMessage {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        _structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        if announce {
            reports.push(Report::fatal(self.message.clone(), vec![]).with_context(node.clone()));
        }
        false
    }
}

/// The node's scalar value must not be one of the stored values.
#[derive(Debug, Clone)]
pub struct CannotHaveValue {
    values: Vec<Value>,
}

impl CannotHaveValue {
    /// Forbid the given scalar values.
    ///
    /// # Errors
    ///
    /// `NonScalarValue` when any forbidden value is an array, object, or null.
    pub fn new(values: Vec<Value>) -> Result<Self, SchemaError> {
        require_scalars(&values)?;
        Ok(Self { values })
    }
}

impl Condition for CannotHaveValue {
    fn validate<'doc>(
        &self,
        node: &Node<'doc>,
        structure: &Structure,
        reports: &mut ReportTree<'doc>,
        announce: bool,
    ) -> bool {
        let forbidden = node.is_type(Datatype::SCALAR) && self.values.contains(node.value());
        if !forbidden {
            return true;
        }
        if announce {
            reports.push(
                Report::warning(
                    "Value of {} cannot be any of the following: {}",
                    vec![quoted_key(structure), render_values(&self.values)],
                )
                .with_context(node.clone()),
            );
        }
        false
    }
}
