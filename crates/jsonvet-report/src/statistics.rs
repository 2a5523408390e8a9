//! # Statistics — Path-Keyed Shape Counters
//!
//! An additive accumulator over nested string paths, fed once per visited
//! document position by the report tree. Counters are floats; reads of
//! absent paths are 0. Key order is sorted, so exported aggregates are
//! deterministic.

use std::collections::BTreeMap;

use jsonvet_core::{Datatype, Node};
use serde::Serialize;
use serde_json::Value;

/// One entry in the statistics tree: a counter or a nested group.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatEntry {
    /// A leaf counter.
    Count(f64),
    /// A nested group of entries.
    Group(BTreeMap<String, StatEntry>),
}

/// Additive, path-keyed aggregate counters over a document's shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    entries: BTreeMap<String, StatEntry>,
}

impl Statistics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the counter at the given path. Absent paths read as 0. A
    /// counter met before the path is exhausted is returned as-is.
    pub fn get(&self, path: &[&str]) -> f64 {
        let mut current = &self.entries;
        for segment in path {
            match current.get(*segment) {
                Some(StatEntry::Count(value)) => return *value,
                Some(StatEntry::Group(group)) => current = group,
                None => return 0.0,
            }
        }
        0.0
    }

    /// Set the counter at the given path, creating intermediate groups and
    /// replacing whatever was there.
    pub fn set(&mut self, value: f64, path: &[&str]) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut current = &mut self.entries;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| StatEntry::Group(BTreeMap::new()));
            if !matches!(entry, StatEntry::Group(_)) {
                *entry = StatEntry::Group(BTreeMap::new());
            }
            let StatEntry::Group(group) = entry else {
                return;
            };
            current = group;
        }
        current.insert(last.to_string(), StatEntry::Count(value));
    }

    /// Add onto the counter at the given path.
    pub fn add(&mut self, amount: f64, path: &[&str]) {
        let current = self.get(path);
        self.set(current + amount, path);
    }

    /// Export the accumulator as a JSON value with sorted keys.
    pub fn as_json(&self) -> Value {
        serde_json::to_value(&self.entries).unwrap_or(Value::Null)
    }

    /// Seed the default counter families on first use.
    fn normalize(&mut self) {
        if !self.is_empty() {
            return;
        }
        self.entries.insert("keys".into(), StatEntry::Group(BTreeMap::new()));
        self.entries.insert("datatypes".into(), StatEntry::Group(BTreeMap::new()));
        self.set(0.0, &["elements", "total"]);
        self.set(0.0, &["fields", "total"]);
        self.entries.insert(
            "root".into(),
            StatEntry::Group(BTreeMap::from([
                ("datatypes".to_string(), StatEntry::Group(BTreeMap::new())),
                ("children".to_string(), StatEntry::Count(0.0)),
            ])),
        );
    }

    /// Record one visited document position.
    ///
    /// The root contributes its datatype and child count under `root`;
    /// every other position contributes per-key counters, a datatype
    /// counter, and an element or field total depending on its parent.
    pub fn record(&mut self, node: &Node<'_>) {
        self.normalize();

        let type_name = node.datatype().stat_name();

        let Some(parent) = node.parent() else {
            self.add(1.0, &["root", "datatypes", &type_name]);
            let children = match node.value() {
                Value::Array(values) => Some(values.len()),
                Value::Object(map) => Some(map.len()),
                _ => None,
            };
            if let Some(children) = children {
                self.set(children as f64, &["root", "children"]);
            }
            return;
        };

        let key = match node.key() {
            Some(key) => Value::String(key.to_string()).to_string(),
            None => "null".to_string(),
        };

        if node.is_type(Datatype::SCALAR) {
            self.add(1.0, &["keys", &key, "scalar", "total"]);
            self.add(1.0, &["keys", &key, "scalar", "values", &node.render()]);
        } else if node.is_type(Datatype::OBJECT) {
            self.add(1.0, &["keys", &key, "object", "total"]);
        } else if node.is_type(Datatype::ARRAY) {
            self.add(1.0, &["keys", &key, "array", "total"]);
        } else {
            self.add(1.0, &["keys", &key, "null", "total"]);
        }

        self.add(1.0, &["datatypes", &type_name]);

        if parent.is_type(Datatype::ARRAY) {
            self.add(1.0, &["elements", "total"]);
        }
        if parent.is_type(Datatype::OBJECT) {
            self.add(1.0, &["fields", "total"]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_absent_path_is_zero() {
        let stats = Statistics::new();
        assert_eq!(stats.get(&["nothing", "here"]), 0.0);
    }

    #[test]
    fn test_add_is_cumulative() {
        let mut stats = Statistics::new();
        stats.add(1.0, &["a", "b"]);
        stats.add(2.5, &["a", "b"]);
        assert_eq!(stats.get(&["a", "b"]), 3.5);
    }

    #[test]
    fn test_set_overwrites() {
        let mut stats = Statistics::new();
        stats.add(4.0, &["x"]);
        stats.set(1.0, &["x"]);
        assert_eq!(stats.get(&["x"]), 1.0);
    }

    #[test]
    fn test_record_root_object() {
        let doc = json!({"a": 1, "b": 2});
        let mut stats = Statistics::new();
        stats.record(&Node::root(&doc));
        assert_eq!(stats.get(&["root", "datatypes", "object"]), 1.0);
        assert_eq!(stats.get(&["root", "children"]), 2.0);
    }

    #[test]
    fn test_record_scalar_field() {
        let doc = json!({"name": "Ann"});
        let root = Node::root(&doc);
        let field = root.get_field("name").unwrap();
        let mut stats = Statistics::new();
        stats.record(&field);
        assert_eq!(stats.get(&["keys", "\"name\"", "scalar", "total"]), 1.0);
        assert_eq!(
            stats.get(&["keys", "\"name\"", "scalar", "values", "\"Ann\""]),
            1.0
        );
        assert_eq!(stats.get(&["datatypes", "string"]), 1.0);
        assert_eq!(stats.get(&["fields", "total"]), 1.0);
        assert_eq!(stats.get(&["elements", "total"]), 0.0);
    }

    #[test]
    fn test_record_array_element() {
        let doc = json!([null]);
        let root = Node::root(&doc);
        let element = root.get_element(0).unwrap();
        let mut stats = Statistics::new();
        stats.record(&element);
        assert_eq!(stats.get(&["keys", "null", "null", "total"]), 1.0);
        assert_eq!(stats.get(&["elements", "total"]), 1.0);
        assert_eq!(stats.get(&["datatypes", "null"]), 1.0);
    }

    #[test]
    fn test_as_json_has_sorted_keys() {
        let mut stats = Statistics::new();
        stats.add(1.0, &["zebra"]);
        stats.add(1.0, &["apple"]);
        let exported = stats.as_json();
        let keys: Vec<_> = exported.as_object().unwrap().keys().cloned().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
