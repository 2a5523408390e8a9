//! # Audits — Side-Effecting Pre-Checks
//!
//! Audits run before any structural check on a structure, gated by zero or
//! more predicates that all must pass. They are the only sanctioned
//! mutation hook during traversal: an audit receives the per-visit copy of
//! the structure's options and may set `skip` there to suppress the rest
//! of that structure's own check. The shared schema tree is never touched.

use std::fmt;

use jsonvet_core::Node;
use jsonvet_report::ReportTree;

use crate::options::Options;
use crate::predicate::{HasValue, Predicate, SiblingHasValue};
use crate::structure::Structure;

/// A predicate-gated, side-effecting hook running before structural checks.
pub trait Audit: fmt::Debug + Send + Sync {
    /// Inspect the node and the owning structure. `options` is the
    /// per-visit copy of the structure's options; setting `skip` there
    /// suppresses the remainder of the structure's own check.
    fn audit<'doc>(
        &self,
        structure: &Structure,
        options: &mut Options,
        node: &Node<'doc>,
        reports: &mut ReportTree<'doc>,
    );
}

/// Report when the node's value is not one of the expected scalars.
#[derive(Debug, Clone)]
pub struct ValueMatches {
    predicate: HasValue,
}

impl ValueMatches {
    /// Wrap a [`HasValue`] predicate; its report is used on failure.
    pub fn new(predicate: HasValue) -> Self {
        Self { predicate }
    }
}

impl Audit for ValueMatches {
    fn audit<'doc>(
        &self,
        _structure: &Structure,
        _options: &mut Options,
        node: &Node<'doc>,
        reports: &mut ReportTree<'doc>,
    ) {
        if !self.predicate.test(node) {
            reports.push(self.predicate.report().with_context(node.clone()));
        }
    }
}

/// Report when a named sibling's value is not one of the expected scalars.
#[derive(Debug, Clone)]
pub struct SiblingValueMatches {
    predicate: SiblingHasValue,
}

impl SiblingValueMatches {
    /// Wrap a [`SiblingHasValue`] predicate; its report is used on failure.
    pub fn new(predicate: SiblingHasValue) -> Self {
        Self { predicate }
    }
}

impl Audit for SiblingValueMatches {
    fn audit<'doc>(
        &self,
        _structure: &Structure,
        _options: &mut Options,
        node: &Node<'doc>,
        reports: &mut ReportTree<'doc>,
    ) {
        if !self.predicate.test(node) {
            reports.push(self.predicate.report().with_context(node.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_matches_reports_on_mismatch() {
        let audit = ValueMatches::new(HasValue::new(vec![json!("on"), json!("off")]).unwrap());
        let structure = Structure::string(Some("switch"), true);
        let mut options = structure.options().clone();

        let bad = json!("broken");
        let mut reports = ReportTree::new(None, None);
        audit.audit(&structure, &mut options, &Node::root(&bad), &mut reports);
        assert_eq!(reports.warnings().len(), 1);
        assert!(reports.warnings()[0].context().is_some());

        let good = json!("on");
        let mut reports = ReportTree::new(None, None);
        audit.audit(&structure, &mut options, &Node::root(&good), &mut reports);
        assert!(!reports.has_warnings());
    }

    #[test]
    fn test_sibling_value_matches() {
        let audit = SiblingValueMatches::new(
            SiblingHasValue::new("mode", vec![json!("fast")]).unwrap(),
        );
        let structure = Structure::object(Some("payload"), true, vec![]);
        let mut options = structure.options().clone();

        let doc = json!({"mode": "slow", "payload": {}});
        let root = Node::root(&doc);
        let payload = root.get_field("payload").unwrap();
        let mut reports = ReportTree::new(None, None);
        audit.audit(&structure, &mut options, &payload, &mut reports);
        assert_eq!(reports.warnings().len(), 1);
    }

    #[test]
    fn test_audit_can_set_skip_on_visit_options() {
        // A custom audit that suppresses further checks.
        #[derive(Debug)]
        struct SkipAll;
        impl Audit for SkipAll {
            fn audit<'doc>(
                &self,
                _structure: &Structure,
                options: &mut Options,
                _node: &Node<'doc>,
                _reports: &mut ReportTree<'doc>,
            ) {
                options.set_skip(true);
            }
        }

        let structure = Structure::string(Some("x"), true);
        let mut visit = structure.options().clone();
        let doc = json!(1);
        let mut reports = ReportTree::new(None, None);
        SkipAll.audit(&structure, &mut visit, &Node::root(&doc), &mut reports);
        assert!(visit.skip());
        // The shared schema options are untouched.
        assert!(!structure.options().skip());
    }
}
