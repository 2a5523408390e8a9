//! # ReportTree — Depth-Mirroring Diagnostic Container
//!
//! One tree node per (schema position, document position) pairing visited
//! during a comparison. The root is created when a comparison starts;
//! every recursive descent creates exactly one child via
//! [`ReportTree::create_child`], which also feeds the visited document
//! position into the shared [`Statistics`] accumulator exactly once.
//!
//! The accumulator handle is a per-run `Arc<Mutex<_>>`: comparisons are
//! synchronous, and distinct runs use distinct accumulators.

use std::sync::{Arc, Mutex};

use jsonvet_core::Node;

use crate::report::{Report, Severity};
use crate::statistics::Statistics;

/// The diagnostics gathered at one depth of a comparison, plus children
/// for every deeper position visited.
#[derive(Debug)]
pub struct ReportTree<'doc> {
    key: Option<String>,
    node: Option<Node<'doc>>,
    info: Vec<Report<'doc>>,
    warnings: Vec<Report<'doc>>,
    fatals: Vec<Report<'doc>>,
    children: Vec<ReportTree<'doc>>,
    statistics: Option<Arc<Mutex<Statistics>>>,
}

impl<'doc> ReportTree<'doc> {
    /// Create a root report tree without statistics.
    pub fn new(node: Option<Node<'doc>>, key: Option<String>) -> Self {
        Self {
            key,
            node,
            info: Vec::new(),
            warnings: Vec::new(),
            fatals: Vec::new(),
            children: Vec::new(),
            statistics: None,
        }
    }

    /// Create a root report tree feeding the given statistics accumulator.
    ///
    /// The root's own node is recorded immediately.
    pub fn with_statistics(
        node: Option<Node<'doc>>,
        key: Option<String>,
        statistics: Arc<Mutex<Statistics>>,
    ) -> Self {
        let mut tree = Self::new(node, key);
        tree.statistics = Some(statistics);
        tree.record_node();
        tree
    }

    fn record_node(&mut self) {
        let (Some(handle), Some(node)) = (&self.statistics, &self.node) else {
            return;
        };
        // A poisoned accumulator means another run panicked; reporting
        // continues without it.
        if let Ok(mut statistics) = handle.lock() {
            statistics.record(node);
        }
    }

    /// Create the child tree for one deeper position and return it for the
    /// caller to fill. The child inherits the statistics handle and records
    /// its node exactly once, here.
    pub fn create_child(
        &mut self,
        node: Option<Node<'doc>>,
        key: Option<String>,
    ) -> &mut ReportTree<'doc> {
        let mut child = ReportTree::new(node, key);
        child.statistics = self.statistics.clone();
        child.record_node();
        self.children.push(child);
        // Just pushed, so the vector cannot be empty.
        let index = self.children.len() - 1;
        &mut self.children[index]
    }

    /// Add a report at this depth, dispatched by severity.
    pub fn push(&mut self, report: Report<'doc>) {
        match report.severity() {
            Severity::Info => self.info.push(report),
            Severity::Warning => self.warnings.push(report),
            Severity::Fatal => self.fatals.push(report),
        }
    }

    /// The expected key at this depth, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The document position at this depth, if any.
    pub fn node(&self) -> Option<&Node<'doc>> {
        self.node.as_ref()
    }

    /// The statistics accumulator attached to this run, if any.
    pub fn statistics(&self) -> Option<&Arc<Mutex<Statistics>>> {
        self.statistics.as_ref()
    }

    /// Info reports at this depth only.
    pub fn info(&self) -> &[Report<'doc>] {
        &self.info
    }

    /// Warnings at this depth only.
    pub fn warnings(&self) -> &[Report<'doc>] {
        &self.warnings
    }

    /// Fatals at this depth only.
    pub fn fatals(&self) -> &[Report<'doc>] {
        &self.fatals
    }

    /// Child trees, in visit order.
    pub fn children(&self) -> &[ReportTree<'doc>] {
        &self.children
    }

    /// Whether there is info at this depth.
    pub fn has_info(&self) -> bool {
        !self.info.is_empty()
    }

    /// Whether there are warnings at this depth.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether there are fatals at this depth.
    pub fn has_fatals(&self) -> bool {
        !self.fatals.is_empty()
    }

    /// Whether there is info at any depth.
    pub fn has_any_info(&self) -> bool {
        self.has_info() || self.children.iter().any(ReportTree::has_any_info)
    }

    /// Whether there are warnings at any depth.
    pub fn has_any_warnings(&self) -> bool {
        self.has_warnings() || self.children.iter().any(ReportTree::has_any_warnings)
    }

    /// Whether there are fatals at any depth.
    pub fn has_any_fatals(&self) -> bool {
        self.has_fatals() || self.children.iter().any(ReportTree::has_any_fatals)
    }

    fn collect<'a>(
        &'a self,
        pick: fn(&'a ReportTree<'doc>) -> &'a [Report<'doc>],
        out: &mut Vec<&'a Report<'doc>>,
    ) {
        out.extend(pick(self));
        for child in &self.children {
            child.collect(pick, out);
        }
    }

    /// All info reports at any depth, depth-first, this depth first.
    pub fn all_info(&self) -> Vec<&Report<'doc>> {
        let mut out = Vec::new();
        self.collect(|tree| &tree.info, &mut out);
        out
    }

    /// All warnings at any depth, depth-first, this depth first.
    pub fn all_warnings(&self) -> Vec<&Report<'doc>> {
        let mut out = Vec::new();
        self.collect(|tree| &tree.warnings, &mut out);
        out
    }

    /// All fatals at any depth, depth-first, this depth first.
    pub fn all_fatals(&self) -> Vec<&Report<'doc>> {
        let mut out = Vec::new();
        self.collect(|tree| &tree.fatals, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_dispatches_by_severity() {
        let mut tree = ReportTree::new(None, None);
        tree.push(Report::info("i", vec![]));
        tree.push(Report::warning("w", vec![]));
        tree.push(Report::fatal("f", vec![]));
        assert_eq!(tree.info().len(), 1);
        assert_eq!(tree.warnings().len(), 1);
        assert_eq!(tree.fatals().len(), 1);
    }

    #[test]
    fn test_summaries_see_deep_reports() {
        let mut tree = ReportTree::new(None, None);
        {
            let child = tree.create_child(None, Some("inner".into()));
            let grandchild = child.create_child(None, None);
            grandchild.push(Report::fatal("deep", vec![]));
        }
        assert!(!tree.has_fatals());
        assert!(tree.has_any_fatals());
        assert!(!tree.has_any_warnings());
        let fatals = tree.all_fatals();
        assert_eq!(fatals.len(), 1);
        assert_eq!(fatals[0].format(), "deep");
    }

    #[test]
    fn test_aggregation_order_is_self_first() {
        let mut tree = ReportTree::new(None, None);
        tree.push(Report::warning("outer", vec![]));
        tree.create_child(None, None)
            .push(Report::warning("inner", vec![]));
        let warnings = tree.all_warnings();
        assert_eq!(warnings[0].format(), "outer");
        assert_eq!(warnings[1].format(), "inner");
    }

    #[test]
    fn test_statistics_fed_once_per_visited_node() {
        let doc = json!({"a": 1, "b": [true]});
        let root_node = Node::root(&doc);
        let statistics = Arc::new(Mutex::new(Statistics::new()));
        let mut tree = ReportTree::with_statistics(
            Some(root_node.clone()),
            None,
            Arc::clone(&statistics),
        );

        let a = root_node.get_field("a").unwrap();
        tree.create_child(Some(a), Some("a".into()));
        let b = root_node.get_field("b").unwrap();
        let b_reports = tree.create_child(Some(b.clone()), Some("b".into()));
        let element = b.get_element(0).unwrap();
        b_reports.create_child(Some(element), None);

        let stats = statistics.lock().unwrap();
        // Three non-root visits: a, b, and b's element.
        assert_eq!(stats.get(&["datatypes", "integer"]), 1.0);
        assert_eq!(stats.get(&["datatypes", "array"]), 1.0);
        assert_eq!(stats.get(&["datatypes", "boolean"]), 1.0);
        assert_eq!(stats.get(&["root", "datatypes", "object"]), 1.0);
        assert_eq!(stats.get(&["fields", "total"]), 2.0);
        assert_eq!(stats.get(&["elements", "total"]), 1.0);
    }

    #[test]
    fn test_children_without_statistics() {
        let mut tree = ReportTree::new(None, None);
        let child = tree.create_child(None, Some("k".into()));
        assert_eq!(child.key(), Some("k"));
        assert!(tree.statistics().is_none());
    }
}
