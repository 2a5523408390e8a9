//! # Options — Per-Structure Configuration
//!
//! A plain configuration value owned by exactly one structure. The only
//! mutation after construction happens on per-visit copies handed to
//! audits, never on the copy stored in the shared schema tree.

use jsonvet_core::Datatype;

use crate::registry::SchemaId;

/// Configuration of one schema structure.
#[derive(Debug, Clone)]
pub struct Options {
    expected_type: Datatype,
    required: bool,
    placeholder: bool,
    branch_holder: bool,
    ancestor: Option<SchemaId>,
    redirect: Option<SchemaId>,
    skip: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            expected_type: Datatype::ANY,
            required: true,
            placeholder: false,
            branch_holder: false,
            ancestor: None,
            redirect: None,
            skip: false,
        }
    }
}

impl Options {
    /// Start building options.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// The datatypes this structure accepts.
    pub fn expected_type(&self) -> Datatype {
        self.expected_type
    }

    /// Whether the datatype overlaps the accepted mask.
    pub fn is_expected_type(&self, datatype: Datatype) -> bool {
        self.expected_type.intersects(datatype)
    }

    /// Whether the structure must exist within the input.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the structure's key matches any sibling key of the correct
    /// datatype.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Whether the structure dispatches through a branch.
    pub fn is_branch_holder(&self) -> bool {
        self.branch_holder
    }

    /// Whether the structure resolves through an ancestor.
    pub fn uses_ancestor(&self) -> bool {
        self.ancestor.is_some()
    }

    /// The ancestor identity to locate on the parent chain, if any.
    pub fn ancestor(&self) -> Option<SchemaId> {
        self.ancestor
    }

    /// Whether the structure resolves through the registry.
    pub fn redirects(&self) -> bool {
        self.redirect.is_some()
    }

    /// The registry identity to resolve, if any. Takes precedence over the
    /// ancestor when both are set.
    pub fn redirect_target(&self) -> Option<SchemaId> {
        self.redirect
    }

    /// Whether the remainder of the owning structure's check is suppressed.
    pub fn skip(&self) -> bool {
        self.skip
    }

    /// Suppress the remainder of the owning structure's check. Meaningful
    /// only on the per-visit copy handed to audits.
    pub fn set_skip(&mut self, skip: bool) {
        self.skip = skip;
    }

    /// Replace the accepted datatypes. Audits may use this to widen or
    /// narrow the check for the current visit.
    pub fn set_expected_type(&mut self, expected_type: Datatype) {
        self.expected_type = expected_type;
    }

    /// Change whether the structure is required for the current visit.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: bool) {
        self.placeholder = placeholder;
    }
}

/// Owned builder for [`Options`].
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Set the accepted datatypes.
    pub fn datatype(mut self, datatype: Datatype) -> Self {
        self.options.expected_type = datatype;
        self
    }

    /// Set whether the structure must exist.
    pub fn required(mut self, required: bool) -> Self {
        self.options.required = required;
        self
    }

    /// Mark the structure's key as matching any sibling key.
    pub fn placeholder(mut self) -> Self {
        self.options.placeholder = true;
        self
    }

    /// Mark the structure as dispatching through a branch.
    pub fn branch_holder(mut self) -> Self {
        self.options.branch_holder = true;
        self
    }

    /// Resolve through the ancestor with the given identity.
    pub fn ancestor(mut self, id: SchemaId) -> Self {
        self.options.ancestor = Some(id);
        self
    }

    /// Resolve through the registry entry with the given identity.
    pub fn redirect(mut self, id: SchemaId) -> Self {
        self.options.redirect = Some(id);
        self
    }

    /// Finish building.
    pub fn build(self) -> Options {
        self.options
    }
}
