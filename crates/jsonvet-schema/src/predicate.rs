//! # Predicates — Side-Effect-Free Tests
//!
//! A predicate answers one question about a document position and carries
//! a ready-made diagnostic for callers that want to report its failure.
//! Predicates gate branches and audits; they never write reports
//! themselves.

use std::fmt;

use jsonvet_core::{Datatype, Node};
use jsonvet_report::Report;
use serde_json::Value;

use crate::error::SchemaError;

/// A side-effect-free test against a document position.
pub trait Predicate: fmt::Debug + Send + Sync {
    /// Whether the node passes the test.
    fn test(&self, node: &Node<'_>) -> bool;

    /// A ready-made diagnostic to use when the test fails.
    fn report(&self) -> Report<'static>;
}

/// Always passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTrue;

impl Predicate for AlwaysTrue {
    fn test(&self, _node: &Node<'_>) -> bool {
        true
    }

    fn report(&self) -> Report<'static> {
        Report::warning("Predicate failed", vec![])
    }
}

/// Never passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFalse;

impl Predicate for AlwaysFalse {
    fn test(&self, _node: &Node<'_>) -> bool {
        false
    }

    fn report(&self) -> Report<'static> {
        Report::warning("Predicate failed", vec![])
    }
}

/// Passes when the node's datatype overlaps the stored mask.
#[derive(Debug, Clone, Copy)]
pub struct HasDatatype {
    datatype: Datatype,
}

impl HasDatatype {
    /// Expect the given datatypes.
    pub fn new(datatype: Datatype) -> Self {
        Self { datatype }
    }
}

impl Predicate for HasDatatype {
    fn test(&self, node: &Node<'_>) -> bool {
        node.is_type(self.datatype)
    }

    fn report(&self) -> Report<'static> {
        Report::warning(
            "Datatype of the value must be {}",
            vec![Report::keys(self.datatype.names())],
        )
    }
}

/// Ensure a set of expected values contains only scalars.
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

/// Render a scalar set for diagnostics.
fn render_values(values: &[Value]) -> String {
    Report::values(values.iter().map(Value::to_string))
}

/// Passes when the node's value is one of the stored scalars.
///
/// Equality is strict `serde_json::Value` equality: `1` and `1.0` are
/// distinct values.
#[derive(Debug, Clone)]
pub struct HasValue {
    values: Vec<Value>,
}

impl HasValue {
    /// Expect one of the given scalar values.
    ///
    /// # Errors
    ///
    /// `NonScalarValue` when any expected value is an array, object, or null.
    pub fn new(values: Vec<Value>) -> Result<Self, SchemaError> {
        require_scalars(&values)?;
        Ok(Self { values })
    }

    pub(crate) fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Predicate for HasValue {
    fn test(&self, node: &Node<'_>) -> bool {
        node.is_type(Datatype::SCALAR) && self.values.contains(node.value())
    }

    fn report(&self) -> Report<'static> {
        Report::warning(
            "Field can only have one of the following values: {}",
            vec![render_values(&self.values)],
        )
    }
}

/// Passes when a named sibling field has one of the stored scalar values.
///
/// Looks the field up on the node's parent. Fails closed: no parent or no
/// such sibling means failure.
#[derive(Debug, Clone)]
pub struct SiblingHasValue {
    sibling: String,
    values: HasValue,
}

impl SiblingHasValue {
    /// Expect the named sibling to have one of the given scalar values.
    ///
    /// # Errors
    ///
    /// `NonScalarValue` when any expected value is an array, object, or null.
    pub fn new(sibling: impl Into<String>, values: Vec<Value>) -> Result<Self, SchemaError> {
        Ok(Self {
            sibling: sibling.into(),
            values: HasValue::new(values)?,
        })
    }
}

impl Predicate for SiblingHasValue {
    fn test(&self, node: &Node<'_>) -> bool {
        let Some(parent) = node.parent() else {
            return false;
        };
        match parent.get_field(&self.sibling) {
            Ok(sibling) => self.values.test(&sibling),
            Err(_) => false,
        }
    }

    fn report(&self) -> Report<'static> {
        Report::warning(
            "Sibling {} can only have one of the following values: {}",
            vec![
                Report::keys([self.sibling.as_str()]),
                render_values(self.values.values()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_always_true_and_false() {
        let doc = json!(null);
        let node = Node::root(&doc);
        assert!(AlwaysTrue.test(&node));
        assert!(!AlwaysFalse.test(&node));
    }

    #[test]
    fn test_has_datatype() {
        let doc = json!(3.5);
        let node = Node::root(&doc);
        assert!(HasDatatype::new(Datatype::NUMBER).test(&node));
        assert!(!HasDatatype::new(Datatype::STRING).test(&node));
    }

    #[test]
    fn test_has_value_strict_equality() {
        let predicate = HasValue::new(vec![json!(1), json!("on")]).unwrap();
        let one = json!(1);
        assert!(predicate.test(&Node::root(&one)));
        let one_point_zero = json!(1.0);
        assert!(!predicate.test(&Node::root(&one_point_zero)));
        let on = json!("on");
        assert!(predicate.test(&Node::root(&on)));
        let off = json!("off");
        assert!(!predicate.test(&Node::root(&off)));
    }

    #[test]
    fn test_has_value_rejects_non_scalars() {
        let err = HasValue::new(vec![json!([1])]).unwrap_err();
        assert!(matches!(err, SchemaError::NonScalarValue { .. }));
        assert!(HasValue::new(vec![json!(null)]).is_err());
    }

    #[test]
    fn test_has_value_fails_on_containers() {
        let predicate = HasValue::new(vec![json!(1)]).unwrap();
        let doc = json!([1]);
        assert!(!predicate.test(&Node::root(&doc)));
    }

    #[test]
    fn test_sibling_has_value() {
        let doc = json!({"mode": "fast", "payload": {}});
        let root = Node::root(&doc);
        let payload = root.get_field("payload").unwrap();
        let matching = SiblingHasValue::new("mode", vec![json!("fast")]).unwrap();
        assert!(matching.test(&payload));
        let wrong = SiblingHasValue::new("mode", vec![json!("slow")]).unwrap();
        assert!(!wrong.test(&payload));
    }

    #[test]
    fn test_sibling_has_value_fails_closed() {
        let doc = json!({"payload": {}});
        let root = Node::root(&doc);
        let payload = root.get_field("payload").unwrap();
        let predicate = SiblingHasValue::new("mode", vec![json!("fast")]).unwrap();
        // Absent sibling.
        assert!(!predicate.test(&payload));
        // No parent at all.
        assert!(!predicate.test(&root));
    }

    #[test]
    fn test_reports_render_expectations() {
        let predicate = SiblingHasValue::new("mode", vec![json!("a"), json!(2)]).unwrap();
        let report = predicate.report();
        assert_eq!(report.args()[0], "\"mode\"");
        assert_eq!(report.args()[1], "\"a\", 2");
    }
}
