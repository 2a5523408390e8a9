//! # Node — A Typed Position in a Decoded Document
//!
//! A [`Node`] wraps one position of an already-decoded `serde_json::Value`
//! tree with its key, its derived [`Datatype`], and a reference to the
//! parent position it was reached from. Nodes are created lazily while
//! descending — the parent chain only ever points upward, so the graph is
//! acyclic and the document itself is never copied.
//!
//! Raw-text concerns (lexing, syntax-error localization, duplicate keys)
//! belong to the external parser; [`parse_document`] is a thin delegation
//! to `serde_json` that surfaces the parser's line/column on failure.

use std::sync::Arc;

use serde_json::Value;

use crate::datatype::Datatype;
use crate::error::DocumentError;
use crate::nodeset::NodeSet;

/// Parse raw JSON text into a decoded value tree.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] with the parser's line/column when the
/// text is not well-formed JSON.
pub fn parse_document(raw: &str) -> Result<Value, DocumentError> {
    serde_json::from_str(raw).map_err(|e| DocumentError::Parse {
        reason: e.to_string(),
        line: e.line(),
        column: e.column(),
    })
}

/// One position in a decoded document.
///
/// Cheap to clone: the value is borrowed and the parent chain is shared.
#[derive(Debug, Clone)]
pub struct Node<'doc> {
    key: Option<String>,
    value: &'doc Value,
    datatype: Datatype,
    parent: Option<Arc<Node<'doc>>>,
}

impl<'doc> Node<'doc> {
    /// Wrap the root of a decoded document.
    pub fn root(value: &'doc Value) -> Self {
        Self {
            key: None,
            value,
            datatype: Datatype::of(value),
            parent: None,
        }
    }

    /// Create a child position reached from this node.
    fn child(&self, key: Option<String>, value: &'doc Value) -> Self {
        Self {
            key,
            value,
            datatype: Datatype::of(value),
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// The key this position was reached by, absent for the root and for
    /// array elements.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The decoded value at this position.
    pub fn value(&self) -> &'doc Value {
        self.value
    }

    /// The datatype derived from the value at construction.
    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    /// The position this node was reached from, absent for the root.
    pub fn parent(&self) -> Option<&Node<'doc>> {
        self.parent.as_deref()
    }

    /// Whether the datatype overlaps the given mask.
    pub fn is_type(&self, datatype: Datatype) -> bool {
        self.datatype.intersects(datatype)
    }

    /// The key of this position, or `(root)` when keyless.
    pub fn key_label(&self) -> &str {
        self.key.as_deref().unwrap_or("(root)")
    }

    fn require_object(&self, subject: &str) -> Result<&'doc serde_json::Map<String, Value>, DocumentError> {
        self.value.as_object().ok_or_else(|| DocumentError::WrongType {
            subject: subject.to_string(),
            expected: Datatype::OBJECT.to_string(),
            actual: self.datatype.to_string(),
        })
    }

    fn require_array(&self, subject: &str) -> Result<&'doc Vec<Value>, DocumentError> {
        self.value.as_array().ok_or_else(|| DocumentError::WrongType {
            subject: subject.to_string(),
            expected: Datatype::ARRAY.to_string(),
            actual: self.datatype.to_string(),
        })
    }

    /// The keys of this object, in document order.
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an object.
    pub fn get_keys(&self) -> Result<Vec<String>, DocumentError> {
        let map = self.require_object(&format!("keys within \"{}\"", self.key_label()))?;
        Ok(map.keys().cloned().collect())
    }

    /// The keys of this object that are not in the provided valid list,
    /// preserving document order.
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an object.
    pub fn get_invalid_keys(&self, valid: &[String]) -> Result<Vec<String>, DocumentError> {
        Ok(self
            .get_keys()?
            .into_iter()
            .filter(|key| !valid.contains(key))
            .collect())
    }

    /// Whether this object has the named field.
    pub fn has_field(&self, key: &str) -> bool {
        self.value
            .as_object()
            .is_some_and(|map| map.contains_key(key))
    }

    /// Whether this object has the named field with a matching datatype.
    pub fn has_field_typed(&self, key: &str, datatype: Datatype) -> bool {
        self.value
            .as_object()
            .and_then(|map| map.get(key))
            .is_some_and(|value| Datatype::of(value).intersects(datatype))
    }

    /// Fetch a field of this object.
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an object, `NotFound` when the
    /// field is absent.
    pub fn get_field(&self, key: &str) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Datatype::ANY)
    }

    /// Fetch a field of this object, requiring its datatype to overlap the
    /// expected mask.
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an object or the field's
    /// datatype does not overlap, `NotFound` when the field is absent.
    pub fn get_field_typed(&self, key: &str, expected: Datatype) -> Result<Self, DocumentError> {
        let map = self.require_object(&format!("field \"{key}\""))?;
        let value = map.get(key).ok_or_else(|| DocumentError::NotFound {
            key: key.to_string(),
        })?;
        let actual = Datatype::of(value);
        if !actual.intersects(expected) {
            return Err(DocumentError::WrongType {
                subject: format!("field \"{key}\""),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(self.child(Some(key.to_string()), value))
    }

    /// Fetch an element of this array by index.
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an array, `NoSuchIndex` when
    /// the index is out of range.
    pub fn get_element(&self, index: usize) -> Result<Self, DocumentError> {
        let values = self.require_array("elements")?;
        let value = values.get(index).ok_or_else(|| DocumentError::NoSuchIndex {
            index,
            key: self.key_label().to_string(),
        })?;
        Ok(self.child(None, value))
    }

    /// All elements of this array whose datatype overlaps the mask, as a
    /// [`NodeSet`] sharing this node's key.
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an array.
    pub fn get_elements(&self, datatype: Datatype) -> Result<NodeSet<'doc>, DocumentError> {
        let values = self.require_array("elements")?;
        let nodes = values
            .iter()
            .filter(|value| Datatype::of(value).intersects(datatype))
            .map(|value| self.child(None, value))
            .collect();
        Ok(NodeSet::new(self.key.clone(), self.datatype, nodes))
    }

    /// All fields of this object whose datatype overlaps the mask, each
    /// tagged with its own key, as a [`NodeSet`].
    ///
    /// # Errors
    ///
    /// `WrongType` when this position is not an object.
    pub fn get_fields(&self, datatype: Datatype) -> Result<NodeSet<'doc>, DocumentError> {
        let map = self.require_object("fields")?;
        let nodes = map
            .iter()
            .filter(|(_, value)| Datatype::of(value).intersects(datatype))
            .map(|(key, value)| self.child(Some(key.clone()), value))
            .collect();
        Ok(NodeSet::new(self.key.clone(), self.datatype, nodes))
    }

    /// Evaluate a predicate against this node, invoking `on_success` when
    /// it passes. Returns 1 on success, 0 on failure.
    pub fn check(
        &self,
        predicate: impl Fn(&Node<'doc>) -> bool,
        mut on_success: impl FnMut(&Node<'doc>),
    ) -> u32 {
        if predicate(self) {
            on_success(self);
            1
        } else {
            0
        }
    }

    /// Render the value as a compact JSON snippet for report arguments.
    pub fn render(&self) -> String {
        self.value.to_string()
    }

    /// Render the value prefixed with its quoted key, when present.
    pub fn render_with_key(&self) -> String {
        match &self.key {
            Some(key) => format!("{}: {}", Value::String(key.clone()), self.value),
            None => self.value.to_string(),
        }
    }
}

impl<'doc> Node<'doc> {
    fn widened(mask: Datatype, nullable: bool) -> Datatype {
        if nullable {
            mask | Datatype::NULL
        } else {
            mask
        }
    }

    /// Fetch a boolean field. With `nullable` set, an explicit `null` is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_boolean(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::BOOLEAN, nullable))
    }

    /// Fetch an integer field. With `nullable` set, an explicit `null` is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_integer(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::INTEGER, nullable))
    }

    /// Fetch a double field. With `nullable` set, an explicit `null` is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_double(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::DOUBLE, nullable))
    }

    /// Fetch an integer or double field. With `nullable` set, an explicit
    /// `null` is also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_number(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::NUMBER, nullable))
    }

    /// Fetch a string field. With `nullable` set, an explicit `null` is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_string(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::STRING, nullable))
    }

    /// Fetch an array field. With `nullable` set, an explicit `null` is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_array(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::ARRAY, nullable))
    }

    /// Fetch an object field. With `nullable` set, an explicit `null` is
    /// also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_object(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::OBJECT, nullable))
    }

    /// Fetch a scalar (number, boolean, or string) field. With `nullable`
    /// set, an explicit `null` is also accepted.
    ///
    /// # Errors
    ///
    /// As [`Node::get_field_typed`].
    pub fn get_scalar(&self, key: &str, nullable: bool) -> Result<Self, DocumentError> {
        self.get_field_typed(key, Self::widened(Datatype::SCALAR, nullable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_has_no_key_or_parent() {
        let doc = json!({"a": 1});
        let root = Node::root(&doc);
        assert_eq!(root.key(), None);
        assert!(root.parent().is_none());
        assert_eq!(root.datatype(), Datatype::OBJECT);
    }

    #[test]
    fn test_get_field_tags_key_and_parent() {
        let doc = json!({"name": "Ann"});
        let root = Node::root(&doc);
        let field = root.get_field("name").unwrap();
        assert_eq!(field.key(), Some("name"));
        assert_eq!(field.datatype(), Datatype::STRING);
        assert!(field.parent().is_some_and(|p| p.key().is_none()));
    }

    #[test]
    fn test_get_field_absent_is_not_found() {
        let doc = json!({"a": 1});
        let root = Node::root(&doc);
        assert_eq!(
            root.get_field("b").unwrap_err(),
            DocumentError::NotFound { key: "b".into() }
        );
    }

    #[test]
    fn test_get_field_typed_rejects_mismatch() {
        let doc = json!({"age": "12"});
        let root = Node::root(&doc);
        let err = root.get_field_typed("age", Datatype::INTEGER).unwrap_err();
        assert!(matches!(err, DocumentError::WrongType { .. }));
    }

    #[test]
    fn test_get_field_on_scalar_is_wrong_type() {
        let doc = json!(42);
        let root = Node::root(&doc);
        assert!(matches!(
            root.get_field("x"),
            Err(DocumentError::WrongType { .. })
        ));
    }

    #[test]
    fn test_get_keys_preserves_document_order() {
        let doc: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let root = Node::root(&doc);
        assert_eq!(root.get_keys().unwrap(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_get_invalid_keys_is_ordered_set_difference() {
        let doc: Value = serde_json::from_str(r#"{"a": 1, "c": 2, "d": 3}"#).unwrap();
        let root = Node::root(&doc);
        let invalid = root
            .get_invalid_keys(&["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(invalid, vec!["c", "d"]);
    }

    #[test]
    fn test_has_field_typed() {
        let doc = json!({"n": 1, "s": "x"});
        let root = Node::root(&doc);
        assert!(root.has_field_typed("n", Datatype::NUMBER));
        assert!(!root.has_field_typed("s", Datatype::NUMBER));
        assert!(!root.has_field_typed("missing", Datatype::ANY));
    }

    #[test]
    fn test_get_element_and_bad_index() {
        let doc = json!([10, 20]);
        let root = Node::root(&doc);
        let element = root.get_element(1).unwrap();
        assert_eq!(element.key(), None);
        assert_eq!(element.value(), &json!(20));
        assert!(matches!(
            root.get_element(2),
            Err(DocumentError::NoSuchIndex { index: 2, .. })
        ));
    }

    #[test]
    fn test_get_elements_filters_by_type() {
        let doc = json!([1, "two", 3, false]);
        let root = Node::root(&doc);
        let numbers = root.get_elements(Datatype::NUMBER).unwrap();
        assert_eq!(numbers.len(), 2);
        let all = root.get_elements(Datatype::ANY).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_get_fields_filters_and_tags_keys() {
        let doc = json!({"x": "1", "y": "2", "z": 3});
        let root = Node::root(&doc);
        let strings = root.get_fields(Datatype::STRING).unwrap();
        assert_eq!(strings.len(), 2);
        let keys: Vec<_> = strings.iter().map(|n| n.key().unwrap().to_string()).collect();
        assert_eq!(keys, vec!["x", "y"]);
    }

    #[test]
    fn test_typed_accessors_widen_with_null() {
        let doc = json!({"a": null});
        let root = Node::root(&doc);
        assert!(root.get_string("a", false).is_err());
        assert!(root.get_string("a", true).is_ok());
    }

    #[test]
    fn test_check_counts_and_invokes() {
        let doc = json!({"a": 5});
        let root = Node::root(&doc);
        let field = root.get_field("a").unwrap();
        let mut seen = 0;
        let passed = field.check(|n| n.is_type(Datatype::INTEGER), |_| seen += 1);
        assert_eq!(passed, 1);
        assert_eq!(seen, 1);
        assert_eq!(field.check(|n| n.is_type(Datatype::STRING), |_| seen += 1), 0);
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_render_forms() {
        let doc = json!({"test": {"hello": false}});
        let root = Node::root(&doc);
        let field = root.get_field("test").unwrap();
        assert_eq!(field.render(), r#"{"hello":false}"#);
        assert_eq!(field.render_with_key(), r#""test": {"hello":false}"#);
        assert_eq!(root.render_with_key(), r#"{"test":{"hello":false}}"#);
    }

    #[test]
    fn test_parse_document_reports_location() {
        assert!(parse_document(r#"{"a": 1}"#).is_ok());
        match parse_document("{\"a\": ") {
            Err(DocumentError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
