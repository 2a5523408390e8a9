//! # Structure — One Node of a Schema Tree
//!
//! A structure describes the expected shape at one position: accepted
//! datatypes, keyed children for objects, element shapes for arrays,
//! attached audits and conditions, an optional branch, and an optional
//! stable identity for self-references. Schema trees are built once via
//! the factory constructors and attachment methods, then treated as
//! immutable for every comparison.

use std::sync::Arc;

use jsonvet_core::Datatype;

use crate::audit::Audit;
use crate::branch::Branch;
use crate::condition::Condition;
use crate::error::SchemaError;
use crate::options::Options;
use crate::predicate::Predicate;
use crate::registry::SchemaId;

/// An audit plus the predicates that must all pass before it runs.
#[derive(Debug, Clone)]
pub struct GuardedAudit {
    audit: Arc<dyn Audit>,
    predicates: Vec<Arc<dyn Predicate>>,
}

impl GuardedAudit {
    /// The audit to run.
    pub fn audit(&self) -> &dyn Audit {
        self.audit.as_ref()
    }

    /// The gating predicates, all of which must pass.
    pub fn predicates(&self) -> &[Arc<dyn Predicate>] {
        &self.predicates
    }
}

/// One schema node describing the expected shape at one position.
#[derive(Debug, Clone)]
pub struct Structure {
    key: Option<String>,
    options: Options,
    children: Vec<Structure>,
    elements: Vec<Structure>,
    audits: Vec<GuardedAudit>,
    conditions: Vec<Arc<dyn Condition>>,
    branch: Option<Branch>,
    identity: Option<SchemaId>,
    branch_bounds: (Option<u32>, Option<u32>),
}

impl Structure {
    /// Create a structure with explicit options.
    pub fn new(key: Option<&str>, options: Options) -> Self {
        Self {
            key: key.map(str::to_string),
            options,
            children: Vec::new(),
            elements: Vec::new(),
            audits: Vec::new(),
            conditions: Vec::new(),
            branch: None,
            identity: None,
            branch_bounds: (None, None),
        }
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// A keyless root structure accepting the given datatypes.
    ///
    /// # Errors
    ///
    /// `ChildrenOnNonObject` when children are given but the datatypes do
    /// not include objects.
    pub fn root(datatype: Datatype, children: Vec<Structure>) -> Result<Self, SchemaError> {
        let mut structure = Self::new(None, Options::builder().datatype(datatype).build());
        structure.add_children(children)?;
        Ok(structure)
    }

    fn typed(key: Option<&str>, datatype: Datatype, required: bool) -> Self {
        Self::new(
            key,
            Options::builder().datatype(datatype).required(required).build(),
        )
    }

    /// A boolean field.
    pub fn boolean(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::BOOLEAN, required)
    }

    /// An integer field.
    pub fn integer(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::INTEGER, required)
    }

    /// A double field.
    pub fn double(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::DOUBLE, required)
    }

    /// An integer-or-double field.
    pub fn number(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::NUMBER, required)
    }

    /// A string field.
    pub fn string(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::STRING, required)
    }

    /// A scalar (number, boolean, or string) field.
    pub fn scalar(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::SCALAR, required)
    }

    /// An explicit-null field.
    pub fn null(key: Option<&str>, required: bool) -> Self {
        Self::typed(key, Datatype::NULL, required)
    }

    /// An object with the given children.
    pub fn object(key: Option<&str>, required: bool, children: Vec<Structure>) -> Self {
        let mut structure = Self::typed(key, Datatype::OBJECT, required);
        structure.children = children;
        structure
    }

    /// An array whose elements are tested against the given shapes.
    pub fn array(key: Option<&str>, required: bool, elements: Vec<Structure>) -> Self {
        let mut structure = Self::typed(key, Datatype::ARRAY, required);
        structure.elements = elements;
        structure
    }

    /// A field accepting several datatypes at once.
    ///
    /// # Errors
    ///
    /// `ChildrenOnNonObject` when children are given but the datatypes do
    /// not include objects.
    pub fn mixed(
        key: Option<&str>,
        datatype: Datatype,
        required: bool,
        children: Vec<Structure>,
    ) -> Result<Self, SchemaError> {
        let mut structure = Self::typed(key, datatype, required);
        structure.add_children(children)?;
        Ok(structure)
    }

    /// A keyless structure matching any sibling key of the given datatypes.
    ///
    /// Fields that do not match the datatypes are left for sibling
    /// structures to claim.
    ///
    /// # Errors
    ///
    /// `ChildrenOnNonObject` when children are given but the datatypes do
    /// not include objects.
    pub fn placeholder(datatype: Datatype, children: Vec<Structure>) -> Result<Self, SchemaError> {
        let mut structure = Self::new(
            None,
            Options::builder().datatype(datatype).placeholder().build(),
        );
        structure.add_children(children)?;
        Ok(structure)
    }

    /// A field that replicates the ancestor carrying the given identity,
    /// located by walking the parent chain. Enables recursive schemas.
    pub fn ascend(key: Option<&str>, required: bool, ancestor: SchemaId) -> Self {
        Self::new(
            key,
            Options::builder().required(required).ancestor(ancestor).build(),
        )
    }

    /// A field that replicates the registered structure with the given
    /// identity, resolved through the caller's registry.
    pub fn redirect(key: Option<&str>, required: bool, target: SchemaId) -> Self {
        Self::new(
            key,
            Options::builder().required(required).redirect(target).build(),
        )
    }

    /// A branch holder: when every gate passes, each candidate is applied
    /// to the field named by its key.
    ///
    /// # Errors
    ///
    /// `BranchCandidateWithoutKey` when a candidate has no key and is not
    /// itself a branch holder.
    pub fn branch(
        label: &str,
        predicates: Vec<Arc<dyn Predicate>>,
        candidates: Vec<Structure>,
    ) -> Result<Self, SchemaError> {
        let mut branch = Branch::new(label, candidates)?;
        for predicate in predicates {
            branch = branch.with_predicate(predicate);
        }
        let mut structure = Self::new(None, Options::builder().branch_holder().build());
        structure.branch = Some(branch);
        Ok(structure)
    }

    /// Wrap an explicitly built branch in a holder structure. Useful when
    /// the branch carries condition gates.
    pub fn holder(branch: Branch) -> Self {
        let mut structure = Self::new(None, Options::builder().branch_holder().build());
        structure.branch = Some(branch);
        structure
    }

    // ------------------------------------------------------------------
    // Attachment
    // ------------------------------------------------------------------

    /// Add a keyed child.
    ///
    /// # Errors
    ///
    /// `ChildrenOnNonObject` when this structure does not accept objects.
    pub fn add_child(&mut self, child: Structure) -> Result<&mut Self, SchemaError> {
        if !self.options.is_expected_type(Datatype::OBJECT) {
            return Err(SchemaError::ChildrenOnNonObject);
        }
        self.children.push(child);
        Ok(self)
    }

    /// Add several keyed children.
    ///
    /// # Errors
    ///
    /// `ChildrenOnNonObject` when this structure does not accept objects.
    pub fn add_children(&mut self, children: Vec<Structure>) -> Result<&mut Self, SchemaError> {
        for child in children {
            self.add_child(child)?;
        }
        Ok(self)
    }

    /// Add an element shape.
    ///
    /// # Errors
    ///
    /// `ElementsOnNonArray` when this structure does not accept arrays.
    pub fn add_element(&mut self, element: Structure) -> Result<&mut Self, SchemaError> {
        if !self.options.is_expected_type(Datatype::ARRAY) {
            return Err(SchemaError::ElementsOnNonArray);
        }
        self.elements.push(element);
        Ok(self)
    }

    /// Add several element shapes.
    ///
    /// # Errors
    ///
    /// `ElementsOnNonArray` when this structure does not accept arrays.
    pub fn add_elements(&mut self, elements: Vec<Structure>) -> Result<&mut Self, SchemaError> {
        for element in elements {
            self.add_element(element)?;
        }
        Ok(self)
    }

    /// Consuming form of [`Structure::add_child`].
    ///
    /// # Errors
    ///
    /// `ChildrenOnNonObject` when this structure does not accept objects.
    pub fn with_child(mut self, child: Structure) -> Result<Self, SchemaError> {
        self.add_child(child)?;
        Ok(self)
    }

    /// Consuming form of [`Structure::add_element`].
    ///
    /// # Errors
    ///
    /// `ElementsOnNonArray` when this structure does not accept arrays.
    pub fn with_element(mut self, element: Structure) -> Result<Self, SchemaError> {
        self.add_element(element)?;
        Ok(self)
    }

    /// Attach an audit, gated by predicates that must all pass before it
    /// runs.
    pub fn with_audit(
        mut self,
        audit: Arc<dyn Audit>,
        predicates: Vec<Arc<dyn Predicate>>,
    ) -> Self {
        self.audits.push(GuardedAudit { audit, predicates });
        self
    }

    /// Attach a condition, evaluated (and announced) during comparison.
    pub fn with_condition(mut self, condition: Arc<dyn Condition>) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Give this structure a stable identity for ancestor and redirect
    /// targeting.
    pub fn with_identity(mut self, identity: SchemaId) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Constrain how many of this structure's branches may succeed.
    /// Violations are warnings, not fatals.
    pub fn with_branch_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.branch_bounds = (min, max);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The key of this structure, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub(crate) fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    /// The configuration of this structure.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// The keyed children, valid when objects are accepted.
    pub fn children(&self) -> &[Structure] {
        &self.children
    }

    /// The element shapes, valid when arrays are accepted.
    pub fn elements(&self) -> &[Structure] {
        &self.elements
    }

    /// The attached audits with their gates, in attachment order.
    pub fn audits(&self) -> &[GuardedAudit] {
        &self.audits
    }

    /// The attached conditions, in attachment order.
    pub fn conditions(&self) -> &[Arc<dyn Condition>] {
        &self.conditions
    }

    /// The branch, present on branch holders.
    pub fn branch_ref(&self) -> Option<&Branch> {
        self.branch.as_ref()
    }

    /// The stable identity, if one was assigned.
    pub fn identity(&self) -> Option<SchemaId> {
        self.identity
    }

    /// The branch success bounds `(min, max)`.
    pub fn branch_bounds(&self) -> (Option<u32>, Option<u32>) {
        self.branch_bounds
    }

    /// Whether this structure dispatches through a branch.
    pub fn is_branch_holder(&self) -> bool {
        self.options.is_branch_holder()
    }

    /// The keys of all keyed children.
    pub fn valid_keys(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|child| child.key().map(str::to_string))
            .collect()
    }
}
