//! Opt-in language rules.

/// Rules shared by pre-analysis and evaluation.
///
/// Everything defaults to strict-mode behaviour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    /// Reject `var` declarations.
    pub no_var: bool,
    /// Assigning an undeclared identifier creates a global binding instead
    /// of throwing `ReferenceError`.
    pub loose_global_assignment: bool,
    /// A function declared in a block also updates a same-named `var` or
    /// function binding of the enclosing function when the declaration runs.
    pub annex_b_block_functions: bool,
}

/// Options for pre-analysis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PrecookOptions {
    pub rules: Rules,
    /// Tolerate `TSAsExpression` / `TSNonNullExpression` wrappers.
    pub typescript: bool,
}

impl PrecookOptions {
    #[must_use]
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }
}
