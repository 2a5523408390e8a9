//! # The Comparison Walk
//!
//! [`Structure::compare`] walks a schema tree and a document tree in
//! lock-step, depth-first and pre-order, emitting diagnostics into a
//! [`ReportTree`]. Per visited structure the order is: audits, skip check,
//! indirection (redirect, then ancestor), key check, type check,
//! conditions, object children, array elements.
//!
//! Data findings never abort the walk; only schema-authoring problems
//! (unknown identities, malformed branch holders) surface as
//! [`SchemaError`].
//!
//! Ancestor references resolve against a borrowed lineage stack threaded
//! through the recursion. Branch holders are transparent middlemen and are
//! skipped during the walk up.

use std::sync::{Arc, Mutex};

use jsonvet_core::{Datatype, DocumentError, Node};
use jsonvet_report::{Report, ReportTree, Statistics};

use crate::branch::Branch;
use crate::error::SchemaError;
use crate::registry::{SchemaId, SchemaRegistry};
use crate::structure::Structure;

/// One frame of the enclosing-structure chain, innermost last.
#[derive(Debug, Clone, Copy)]
struct Lineage<'a> {
    structure: &'a Structure,
    parent: Option<&'a Lineage<'a>>,
}

/// Walk the chain upward for a non-branch-holder structure carrying the
/// target identity. Returns the match and the chain above it.
fn resolve_ancestor<'a>(
    mut lineage: Option<&'a Lineage<'a>>,
    target: SchemaId,
) -> Option<(&'a Structure, Option<&'a Lineage<'a>>)> {
    while let Some(frame) = lineage {
        if !frame.structure.is_branch_holder() && frame.structure.identity() == Some(target) {
            return Some((frame.structure, frame.parent));
        }
        lineage = frame.parent;
    }
    None
}

fn key_label(key: Option<&str>) -> &str {
    key.unwrap_or("(root)")
}

impl Structure {
    /// Compare a document position against this schema, producing the
    /// report tree for the whole subtree.
    ///
    /// # Errors
    ///
    /// Schema-authoring problems only; document findings are reports.
    pub fn compare<'doc>(
        &self,
        node: &Node<'doc>,
        registry: &SchemaRegistry,
    ) -> Result<ReportTree<'doc>, SchemaError> {
        let mut reports = ReportTree::new(Some(node.clone()), self.key().map(str::to_string));
        self.check(node, &mut reports, None, registry)?;
        Ok(reports)
    }

    /// As [`Structure::compare`], additionally feeding every visited node
    /// into the given statistics accumulator. Use one accumulator per run.
    ///
    /// # Errors
    ///
    /// Schema-authoring problems only; document findings are reports.
    pub fn compare_with_statistics<'doc>(
        &self,
        node: &Node<'doc>,
        registry: &SchemaRegistry,
        statistics: Arc<Mutex<Statistics>>,
    ) -> Result<ReportTree<'doc>, SchemaError> {
        let mut reports = ReportTree::with_statistics(
            Some(node.clone()),
            self.key().map(str::to_string),
            statistics,
        );
        self.check(node, &mut reports, None, registry)?;
        Ok(reports)
    }

    fn check<'doc, 'a>(
        &'a self,
        node: &Node<'doc>,
        reports: &mut ReportTree<'doc>,
        lineage: Option<&'a Lineage<'a>>,
        registry: &SchemaRegistry,
    ) -> Result<(), SchemaError> {
        tracing::trace!(key = ?self.key(), datatype = %node.datatype(), "comparing structure");

        // Audits run first, against a per-visit copy of the options. The
        // shared schema tree stays untouched.
        let mut visit = self.options().clone();
        for guarded in self.audits() {
            if guarded.predicates().iter().all(|p| p.test(node)) {
                guarded.audit().audit(self, &mut visit, node, reports);
            }
        }

        // An audit may have suppressed the remainder of this check.
        if visit.skip() {
            return Ok(());
        }

        // Indirection. Redirect wins over ancestor when both are set.
        if let Some(target) = visit.redirect_target() {
            let resolved = registry.resolve(target)?;
            tracing::debug!(identity = %target, "following redirect");
            let mut replica = resolved.clone();
            replica.set_key(self.key().map(str::to_string));
            return replica.check(node, reports, lineage, registry);
        }
        if let Some(target) = visit.ancestor() {
            let (ancestor, above) =
                resolve_ancestor(lineage, target).ok_or(SchemaError::UnknownAncestor(target))?;
            tracing::debug!(identity = %target, "ascending to ancestor");
            let mut replica = ancestor.clone();
            replica.set_key(self.key().map(str::to_string));
            return replica.check(node, reports, above, registry);
        }

        // Key check. Array elements are keyless by construction, so the
        // check only applies when the enclosing structure is not an array.
        let array_element = lineage.map_or(false, |frame| {
            frame.structure.options().is_expected_type(Datatype::ARRAY)
        });
        if !array_element && node.key() != self.key() {
            reports.push(
                Report::fatal(
                    "Key {} does not match the expected key {}",
                    vec![
                        Report::keys([node.key_label()]),
                        Report::keys([key_label(self.key())]),
                    ],
                )
                .with_context(node.clone()),
            );
        }

        // Type check.
        if !visit.is_expected_type(node.datatype()) {
            let expected = visit.expected_type().to_string();
            let actual = node.datatype().to_string();
            let report = match self.key() {
                Some(key) => Report::fatal(
                    "Incorrect datatype for field {} with value {} (expected \"{}\", was \"{}\")",
                    vec![Report::keys([key]), node.render(), expected, actual],
                ),
                None => Report::fatal(
                    "Incorrect datatype for value {} (expected \"{}\", was \"{}\")",
                    vec![node.render_with_key(), expected, actual],
                ),
            };
            reports.push(report.with_context(node.clone()));
        }

        // Directly attached conditions announce their own failures.
        for condition in self.conditions() {
            condition.validate(node, self, reports, true);
        }

        // Object children.
        if visit.is_expected_type(Datatype::OBJECT) && node.is_type(Datatype::OBJECT) {
            let mut discovered_keys: Vec<String> = Vec::new();
            let mut branch_successes: u32 = 0;
            let frame = Lineage {
                structure: self,
                parent: lineage,
            };

            for child in self.children() {
                if child.is_branch_holder() {
                    let branch = child
                        .branch_ref()
                        .ok_or(SchemaError::BranchHolderWithoutBranch)?;
                    if branch.test(node, child, reports) {
                        tracing::debug!(label = branch.label(), "branch taken");
                        reports.push(Report::info(
                            "Successfully branched to {}",
                            vec![Report::keys([branch.label()])],
                        ));
                        branch_successes += 1;
                        let keys = compare_branch(branch, node, reports, &frame, registry)?;
                        discovered_keys.extend(keys);
                    }
                    continue;
                }

                if let Some(key) = child.key() {
                    match node.get_field(key) {
                        Ok(field) => {
                            let child_reports = reports
                                .create_child(Some(field.clone()), Some(key.to_string()));
                            child.check(&field, child_reports, Some(&frame), registry)?;
                        }
                        Err(DocumentError::NotFound { .. }) => {
                            if child.options().is_required() {
                                reports.push(
                                    Report::fatal(
                                        "Missing required field {}",
                                        vec![Report::keys([key])],
                                    )
                                    .with_context(node.clone()),
                                );
                            }
                        }
                        Err(error) => {
                            reports.push(
                                Report::fatal("{}", vec![error.to_string()])
                                    .with_context(node.clone()),
                            );
                        }
                    }
                }

                // Placeholder expansion works on disposable clones, one per
                // matching field, each rekeyed to the field it covers.
                if child.options().is_placeholder() && !child.options().uses_ancestor() {
                    let mut expansion = child.clone();
                    expansion.options_mut().set_placeholder(false);
                    if let Ok(fields) = node.get_fields(child.options().expected_type()) {
                        for field in fields.iter() {
                            let mut per_field = expansion.clone();
                            per_field.set_key(field.key().map(str::to_string));
                            let child_reports = reports.create_child(
                                Some(field.clone()),
                                field.key().map(str::to_string),
                            );
                            per_field.check(field, child_reports, Some(&frame), registry)?;
                            if let Some(key) = field.key() {
                                discovered_keys.push(key.to_string());
                            }
                        }
                    }
                }
            }

            // Branch cardinality is advisory: too few or too many taken
            // branches is suspicious, not necessarily wrong.
            let (min, max) = self.branch_bounds();
            if let Some(min) = min {
                if branch_successes < min {
                    reports.push(
                        Report::warning(
                            "Expected at least {} successful branches, found {}",
                            vec![min.to_string(), branch_successes.to_string()],
                        )
                        .with_context(node.clone()),
                    );
                }
            }
            if let Some(max) = max {
                if branch_successes > max {
                    reports.push(
                        Report::warning(
                            "Expected at most {} successful branches, found {}",
                            vec![max.to_string(), branch_successes.to_string()],
                        )
                        .with_context(node.clone()),
                    );
                }
            }

            // One warning naming every unexpected key together with the
            // full valid-key list.
            let mut valid_keys = discovered_keys;
            valid_keys.extend(self.valid_keys());
            if let Ok(invalid) = node.get_invalid_keys(&valid_keys) {
                if !invalid.is_empty() {
                    reports.push(
                        Report::warning(
                            "Unexpected keys: {}; valid keys are: {}",
                            vec![Report::keys(&invalid), Report::keys(&valid_keys)],
                        )
                        .with_context(node.clone()),
                    );
                }
            }
        }

        // Array elements. Every datatype-compatible declared shape runs,
        // not just the first match: overlapping shapes are each applied.
        if visit.is_expected_type(Datatype::ARRAY) && node.is_type(Datatype::ARRAY) {
            let frame = Lineage {
                structure: self,
                parent: lineage,
            };
            if let Ok(elements) = node.get_elements(Datatype::ANY) {
                for element in elements.iter() {
                    let mut matched = false;
                    for declared in self.elements() {
                        let resolved;
                        let (shape, shape_lineage) =
                            if let Some(target) = declared.options().ancestor() {
                                let (ancestor, above) = resolve_ancestor(Some(&frame), target)
                                    .ok_or(SchemaError::UnknownAncestor(target))?;
                                resolved = ancestor.clone();
                                (&resolved, above)
                            } else {
                                (declared, Some(&frame))
                            };
                        if element.is_type(shape.options().expected_type()) {
                            matched = true;
                            let child_reports =
                                reports.create_child(Some(element.clone()), None);
                            shape.check(element, child_reports, shape_lineage, registry)?;
                        }
                    }
                    if !matched {
                        reports.push(
                            Report::warning(
                                "Element with the following value was not expected: {}",
                                vec![element.render()],
                            )
                            .with_context(element.clone()),
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// Apply every candidate of a taken branch, returning the keys the branch
/// claims on the object.
fn compare_branch<'doc, 'a>(
    branch: &'a Branch,
    node: &Node<'doc>,
    reports: &mut ReportTree<'doc>,
    lineage: &'a Lineage<'a>,
    registry: &SchemaRegistry,
) -> Result<Vec<String>, SchemaError> {
    let mut discovered = Vec::new();
    for candidate in branch.candidates() {
        if candidate.is_branch_holder() {
            let inner = candidate
                .branch_ref()
                .ok_or(SchemaError::BranchHolderWithoutBranch)?;
            if inner.test(node, candidate, reports) {
                reports.push(Report::info(
                    "Successfully branched to {}",
                    vec![Report::keys([inner.label()])],
                ));
                discovered.extend(compare_branch(inner, node, reports, lineage, registry)?);
            }
            continue;
        }

        let key = candidate
            .key()
            .ok_or(SchemaError::BranchCandidateWithoutKey)?;
        match node.get_field(key) {
            Ok(field) => {
                discovered.push(key.to_string());
                let child_reports =
                    reports.create_child(Some(field.clone()), Some(key.to_string()));
                candidate.check(&field, child_reports, Some(lineage), registry)?;
            }
            Err(DocumentError::NotFound { .. }) => {
                if candidate.options().is_required() {
                    reports.push(
                        Report::fatal(
                            "Missing required key {} for branch {}",
                            vec![Report::keys([key]), Report::keys([branch.label()])],
                        )
                        .with_context(node.clone()),
                    );
                }
            }
            Err(error) => {
                reports.push(
                    Report::fatal("{}", vec![error.to_string()]).with_context(node.clone()),
                );
            }
        }
    }
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    #[test]
    fn test_matching_document_is_clean() {
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![
                Structure::string(Some("name"), true),
                Structure::integer(Some("age"), false),
            ],
        )
        .unwrap();
        let doc = json!({"name": "Ann", "age": 12});
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        assert!(!reports.has_any_fatals());
        assert!(!reports.has_any_warnings());
    }

    #[test]
    fn test_missing_required_field_is_one_fatal() {
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![
                Structure::string(Some("name"), true),
                Structure::string(Some("title"), true),
            ],
        )
        .unwrap();
        let doc = json!({});
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        let fatals = reports.all_fatals();
        assert_eq!(fatals.len(), 2);
        assert!(fatals[0].message().contains("\"name\""));
        assert!(fatals[1].message().contains("\"title\""));
    }

    #[test]
    fn test_optional_field_absence_is_silent() {
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![Structure::string(Some("nickname"), false)],
        )
        .unwrap();
        let doc = json!({});
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        assert!(!reports.has_any_fatals());
        assert!(!reports.has_any_warnings());
    }

    #[test]
    fn test_wrong_type_is_fatal_with_details() {
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![Structure::integer(Some("age"), true)],
        )
        .unwrap();
        let doc = json!({"age": "12"});
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        let fatals = reports.all_fatals();
        assert_eq!(fatals.len(), 1);
        let message = fatals[0].message();
        assert!(message.contains("\"age\""));
        assert!(message.contains("expected \"integer\""));
        assert!(message.contains("was \"string\""));
    }

    #[test]
    fn test_unexpected_keys_yield_one_warning() {
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![
                Structure::string(Some("a"), true),
                Structure::string(Some("b"), false),
            ],
        )
        .unwrap();
        let doc = json!({"a": "x", "c": 1, "d": 2});
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        let warnings = reports.all_warnings();
        assert_eq!(warnings.len(), 1);
        let message = warnings[0].message();
        assert!(message.contains("\"c\", \"d\""));
        assert!(message.contains("\"a\", \"b\""));
    }

    #[test]
    fn test_unknown_redirect_identity_is_schema_error() {
        let id = SchemaId::new();
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![Structure::redirect(Some("next"), true, id)],
        )
        .unwrap();
        let doc = json!({"next": {}});
        let err = schema.compare(&Node::root(&doc), &registry()).unwrap_err();
        assert_eq!(err, SchemaError::UnknownIdentity(id));
    }

    #[test]
    fn test_unknown_ancestor_is_schema_error() {
        let id = SchemaId::new();
        let schema = Structure::root(
            Datatype::OBJECT,
            vec![Structure::ascend(Some("child"), true, id)],
        )
        .unwrap();
        let doc = json!({"child": {}});
        let err = schema.compare(&Node::root(&doc), &registry()).unwrap_err();
        assert_eq!(err, SchemaError::UnknownAncestor(id));
    }

    #[test]
    fn test_skip_audit_suppresses_checks() {
        #[derive(Debug)]
        struct SkipAll;
        impl crate::audit::Audit for SkipAll {
            fn audit<'doc>(
                &self,
                _structure: &Structure,
                options: &mut crate::options::Options,
                _node: &Node<'doc>,
                _reports: &mut ReportTree<'doc>,
            ) {
                options.set_skip(true);
            }
        }

        let schema = Structure::root(
            Datatype::OBJECT,
            vec![Structure::integer(Some("age"), true)
                .with_audit(Arc::new(SkipAll), vec![])],
        )
        .unwrap();
        // Wrong type, but the audit skips the check before it runs.
        let doc = json!({"age": "not a number"});
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        assert!(!reports.has_any_fatals());
    }

    #[test]
    fn test_array_structural_or_applies_all_matching_shapes() {
        // Two overlapping element shapes: any scalar, and strings only.
        let schema = Structure::root(Datatype::ARRAY, vec![])
            .unwrap()
            .with_element(Structure::scalar(None, true))
            .unwrap()
            .with_element(Structure::string(None, true))
            .unwrap();

        let doc = json!(["text", 5]);
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        // "text" matches both shapes and produces two child trees; 5
        // matches only the scalar shape.
        assert_eq!(reports.children().len(), 3);
        assert!(!reports.has_any_fatals());
    }

    #[test]
    fn test_unmatched_element_warns_per_element() {
        let schema = Structure::root(Datatype::ARRAY, vec![])
            .unwrap()
            .with_element(Structure::string(None, true))
            .unwrap();
        let doc = json!([1, "ok", true]);
        let reports = schema.compare(&Node::root(&doc), &registry()).unwrap();
        let warnings = reports.all_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message().contains('1'));
        assert!(warnings[1].message().contains("true"));
    }
}
