//! # Branch — Predicate-Gated Alternative Sub-Schemas
//!
//! A branch is a named, conditional dispatch owned by exactly one
//! branch-holder structure: when every gate passes against the incoming
//! node, each candidate sub-schema is applied to the field named by its
//! key. Candidates either carry a key or are branch holders themselves;
//! anything else is a schema-authoring error.
//!
//! Candidate traversal itself lives with the comparison walk; this module
//! owns the model and the gate test.

use std::sync::Arc;

use jsonvet_core::Node;
use jsonvet_report::ReportTree;

use crate::condition::Condition;
use crate::error::SchemaError;
use crate::predicate::Predicate;
use crate::structure::Structure;

/// A named set of alternative sub-schemas behind a compound gate.
#[derive(Debug, Clone)]
pub struct Branch {
    label: String,
    predicates: Vec<Arc<dyn Predicate>>,
    conditions: Vec<Arc<dyn Condition>>,
    candidates: Vec<Structure>,
}

impl Branch {
    /// Create a branch over the given candidates.
    ///
    /// # Errors
    ///
    /// `BranchCandidateWithoutKey` when a candidate has no key and is not
    /// itself a branch holder.
    pub fn new(label: impl Into<String>, candidates: Vec<Structure>) -> Result<Self, SchemaError> {
        for candidate in &candidates {
            if candidate.key().is_none() && !candidate.options().is_branch_holder() {
                return Err(SchemaError::BranchCandidateWithoutKey);
            }
        }
        Ok(Self {
            label: label.into(),
            predicates: Vec::new(),
            conditions: Vec::new(),
            candidates,
        })
    }

    /// Add a predicate gate. All gates must pass for the branch to be
    /// taken.
    pub fn with_predicate(mut self, predicate: Arc<dyn Predicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a condition gate, evaluated silently (no reports).
    pub fn with_condition(mut self, condition: Arc<dyn Condition>) -> Self {
        self.conditions.push(condition);
        self
    }

    /// The user-facing label surfaced on successful branch entry.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The candidate sub-schemas.
    pub fn candidates(&self) -> &[Structure] {
        &self.candidates
    }

    /// Whether every gate passes for the node.
    ///
    /// Predicates short-circuit on the first failure; condition gates run
    /// with announcing disabled, so a failed gate never leaves a report.
    pub fn test<'doc>(
        &self,
        node: &Node<'doc>,
        holder: &Structure,
        reports: &mut ReportTree<'doc>,
    ) -> bool {
        if !self.predicates.iter().all(|predicate| predicate.test(node)) {
            return false;
        }
        self.conditions
            .iter()
            .all(|condition| condition.validate(node, holder, reports, false))
    }
}
