//! Immutable value types for the test matrix: dimensions, test definitions,
//! suites, patches, and their resolved counterparts.
//!
//! Nothing in this module touches the filesystem; these are pure data,
//! produced by the [loader](crate::loader) and consumed by the
//! [resolver](crate::resolver).

use std::fmt::Write as _;

/// A named, ordered list of string values representing one axis of variation.
///
/// `values` must be non-empty to be meaningful, but this is only enforced by
/// the loader, not by this type itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// The dimension's name, referenced by [`TestDefinition::dimension_names`]
    /// and [`PatchRule::dimension_name`].
    pub name: String,

    /// The ordered values of this dimension. Order is significant: `first`
    /// and `last` patch expressions depend on it.
    pub values: Vec<String>,
}

impl Dimension {
    /// Creates a new dimension with the given name and values.
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A reference to a set of dimensions whose Cartesian product defines the
/// parameter space for a test's expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    /// The test's name, used as the top-level output directory and as the
    /// prefix of every test case's identifier.
    pub name: String,

    /// The declared dimension names, in declaration order. Entries that don't
    /// resolve to a declared [`Dimension`] are silently ignored at resolution
    /// time.
    pub dimension_names: Vec<String>,
}

/// A transformation narrowing a dimension's value list.
///
/// See [`PatchRule::apply`] for the expression semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRule {
    /// The dimension this rule targets. `None` means "every dimension of the
    /// target test".
    pub dimension_name: Option<String>,

    /// The patch expression. See [`PatchRule::apply`].
    pub expr: Option<String>,
}

impl PatchRule {
    /// Applies this rule's expression to `dimension`'s values, returning the
    /// patched dimension.
    ///
    /// * `first` retains only `values[0]`.
    /// * `last` retains only the last value.
    /// * `None` is the identity.
    /// * any other string is treated as a substring filter.
    pub fn apply(&self, dimension: &Dimension) -> Dimension {
        let values = match self.expr.as_deref() {
            Some("first") => dimension.values.first().cloned().into_iter().collect(),
            Some("last") => dimension.values.last().cloned().into_iter().collect(),
            None => dimension.values.clone(),
            Some(substring) => dimension
                .values
                .iter()
                .filter(|v| v.contains(substring))
                .cloned()
                .collect(),
        };

        Dimension::new(dimension.name.clone(), values)
    }

    /// Whether this rule applies to `dimension`, i.e. it is unscoped or
    /// scoped to exactly this dimension's name.
    pub fn applies_to(&self, dimension: &Dimension) -> bool {
        self.dimension_name
            .as_deref()
            .is_none_or(|name| name == dimension.name)
    }
}

/// A set of patches to apply to one or more test definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitePatch {
    /// The test this patch targets. `None` means "every selected test".
    pub test_name: Option<String>,

    /// The dimension patch rules to fold into the target test's dimensions.
    pub rules: Vec<PatchRule>,
}

impl SuitePatch {
    /// Whether this patch applies to the test named `test_name`.
    pub fn applies_to(&self, test_name: &str) -> bool {
        self.test_name.as_deref().is_none_or(|name| name == test_name)
    }
}

/// A named view over tests: a selection filter plus a patch list producing a
/// derived set of test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// The suite's name, used to select it for expansion.
    pub name: String,

    /// Names of test definitions to select. An empty list selects all tests.
    pub select: Vec<String>,

    /// Patches to apply to the selected tests' dimensions, in order.
    pub patches: Vec<SuitePatch>,
}

impl Suite {
    /// The implicit suite present even when the input YAML has no `suites`
    /// key: no selection, no patches.
    pub fn implicit_default() -> Self {
        Self {
            name: "default".to_owned(),
            select: Vec::new(),
            patches: Vec::new(),
        }
    }
}

/// A single instance in the matrix: a test definition paired with one
/// assignment of values to its dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// The name of the source test definition.
    pub name: String,

    /// The bindings for this case, one entry per dimension used by the test
    /// definition, in declared dimension order.
    pub bindings: Vec<(String, String)>,
}

impl TestCase {
    /// Creates a new test case from a name and its ordered bindings.
    pub fn new(name: impl Into<String>, bindings: Vec<(String, String)>) -> Self {
        Self {
            name: name.into(),
            bindings,
        }
    }

    /// The stable, on-disk identifier for this case: `name` followed by
    /// `_<dimension>-<value>` for each binding in declared order.
    ///
    /// This is a pure function of `(name, bindings)`; it never consults the
    /// environment or the filesystem.
    pub fn id(&self) -> String {
        let mut id = self.name.clone();
        for (dimension, value) in &self.bindings {
            let _ = write!(id, "_{dimension}-{value}");
        }
        id
    }
}

/// A suite after selection and patching have been resolved to concrete test
/// cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSuite {
    /// The name of the source suite.
    pub name: String,

    /// The resolved test cases, in product order following the test's
    /// declared dimension order.
    pub test_cases: Vec<TestCase>,
}

impl EffectiveSuite {
    /// The distinct test names among this suite's test cases, in first-seen
    /// order.
    pub fn distinct_test_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for test_case in &self.test_cases {
            if !seen.contains(&test_case.name.as_str()) {
                seen.push(test_case.name.as_str());
            }
        }
        seen
    }
}
