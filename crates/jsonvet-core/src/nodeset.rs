//! # NodeSet — Ordered Positions Under One Parent Key
//!
//! The result of a bulk field/element fetch: an ordered sequence of
//! [`Node`]s sharing one logical parent key, tagged with the datatype of
//! the container they came from. The container datatype is fixed at
//! construction and never recomputed.

use crate::datatype::Datatype;
use crate::error::DocumentError;
use crate::node::Node;

/// An ordered set of nodes sharing one logical parent key.
#[derive(Debug, Clone)]
pub struct NodeSet<'doc> {
    key: Option<String>,
    datatype: Datatype,
    nodes: Vec<Node<'doc>>,
}

impl<'doc> NodeSet<'doc> {
    /// Build a set from the source container's key and datatype.
    pub fn new(key: Option<String>, datatype: Datatype, nodes: Vec<Node<'doc>>) -> Self {
        Self { key, datatype, nodes }
    }

    /// The key of the source container, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The datatype of the source container, fixed at construction.
    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The members as a slice.
    pub fn nodes(&self) -> &[Node<'doc>] {
        &self.nodes
    }

    /// Iterate over the members in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node<'doc>> {
        self.nodes.iter()
    }

    /// Fetch a member by index.
    ///
    /// # Errors
    ///
    /// `NoSuchIndex` when the index is out of range.
    pub fn get(&self, index: usize) -> Result<&Node<'doc>, DocumentError> {
        self.nodes.get(index).ok_or_else(|| DocumentError::NoSuchIndex {
            index,
            key: self.key.as_deref().unwrap_or("(root)").to_string(),
        })
    }

    /// Narrow the set to members whose datatype overlaps the mask.
    ///
    /// `ANY` returns a copy of the whole set.
    pub fn filter(&self, datatype: Datatype) -> NodeSet<'doc> {
        if datatype == Datatype::ANY {
            return self.clone();
        }
        Self {
            key: self.key.clone(),
            datatype: self.datatype,
            nodes: self
                .nodes
                .iter()
                .filter(|node| node.is_type(datatype))
                .cloned()
                .collect(),
        }
    }

    /// Evaluate a predicate against every member, invoking `on_success`
    /// for each one that passes. Returns the number of successes.
    pub fn check(
        &self,
        predicate: impl Fn(&Node<'doc>) -> bool,
        mut on_success: impl FnMut(&Node<'doc>),
    ) -> u32 {
        let mut passed = 0;
        for node in &self.nodes {
            passed += node.check(&predicate, &mut on_success);
        }
        passed
    }
}

impl<'a, 'doc> IntoIterator for &'a NodeSet<'doc> {
    type Item = &'a Node<'doc>;
    type IntoIter = std::slice::Iter<'a, Node<'doc>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set<'doc>(doc: &'doc serde_json::Value) -> NodeSet<'doc> {
        Node::root(doc).get_elements(Datatype::ANY).unwrap()
    }

    #[test]
    fn test_len_and_indexing() {
        let doc = json!([1, "two", 3.5]);
        let elements = set(&doc);
        assert_eq!(elements.len(), 3);
        assert_eq!(elements.get(1).unwrap().value(), &json!("two"));
        assert!(matches!(
            elements.get(3),
            Err(DocumentError::NoSuchIndex { index: 3, .. })
        ));
    }

    #[test]
    fn test_container_datatype_is_fixed() {
        let doc = json!([1, 2]);
        let elements = set(&doc);
        assert_eq!(elements.datatype(), Datatype::ARRAY);
        assert_eq!(elements.filter(Datatype::INTEGER).datatype(), Datatype::ARRAY);
    }

    #[test]
    fn test_filter_narrows_and_any_copies() {
        let doc = json!([1, "two", 3, null]);
        let elements = set(&doc);
        assert_eq!(elements.filter(Datatype::INTEGER).len(), 2);
        assert_eq!(elements.filter(Datatype::NULL).len(), 1);
        assert_eq!(elements.filter(Datatype::ANY).len(), 4);
    }

    #[test]
    fn test_check_counts_successes() {
        let doc = json!([1, "two", 3]);
        let elements = set(&doc);
        let mut seen = Vec::new();
        let passed = elements.check(
            |n| n.is_type(Datatype::INTEGER),
            |n| seen.push(n.render()),
        );
        assert_eq!(passed, 2);
        assert_eq!(seen, vec!["1", "3"]);
    }
}
