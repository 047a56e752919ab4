//! Turns dimensions + tests + suites + patches into deterministic
//! [`EffectiveSuite`]s.
//!
//! This module is pure: it never touches the filesystem.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::loader::TestMatrixInput;
use crate::model::{Dimension, EffectiveSuite, Suite, TestCase, TestDefinition};

/// Resolves every suite in `input` (including the implicit `default` suite)
/// into an [`EffectiveSuite`].
#[tracing::instrument(skip_all, fields(suites = input.suites.len()))]
pub fn resolve(input: &TestMatrixInput) -> Vec<EffectiveSuite> {
    input
        .suites
        .iter()
        .map(|suite| resolve_suite(suite, &input.dimensions, &input.tests))
        .collect()
}

#[tracing::instrument(skip_all, fields(suite = %suite.name))]
fn resolve_suite(
    suite: &Suite,
    dimensions: &[Dimension],
    tests: &[TestDefinition],
) -> EffectiveSuite {
    let mut test_cases = Vec::new();

    for test in select_tests(suite, tests) {
        let used_dims: Vec<&Dimension> = test
            .dimension_names
            .iter()
            .filter_map(|name| dimensions.iter().find(|d| &d.name == name))
            .collect();

        let effective_dims = patch_dimensions(suite, &test.name, &used_dims);
        test_cases.extend(expand_test(&test.name, &effective_dims));
    }

    tracing::debug!(count = test_cases.len(), "resolved test cases for suite");

    EffectiveSuite {
        name: suite.name.clone(),
        test_cases,
    }
}

/// Selects test definitions, preserving the order of `tests` (not of
/// `suite.select`). An empty `select` keeps every test.
fn select_tests<'a>(suite: &Suite, tests: &'a [TestDefinition]) -> Vec<&'a TestDefinition> {
    if suite.select.is_empty() {
        return tests.iter().collect();
    }

    tests
        .iter()
        .filter(|t| suite.select.contains(&t.name))
        .collect()
}

/// Applies every patch in the suite to the test's used dimensions, in order.
///
/// Patches are threaded sequentially: each patch folds its rules into an
/// overrides map (multiple rules on the same dimension within one patch are
/// computed against that dimension's value at the *start* of the patch, last
/// rule wins), then the overrides replace the matching dimensions before the
/// next patch runs. So a rule in a later patch sees the *result* of earlier
/// patches, while rules within the same patch do not see each other's
/// output.
fn patch_dimensions(suite: &Suite, test_name: &str, used_dims: &[&Dimension]) -> Vec<Dimension> {
    let mut current: Vec<Dimension> = used_dims.iter().map(|dim| (*dim).clone()).collect();

    for patch in &suite.patches {
        if !patch.applies_to(test_name) {
            continue;
        }

        let mut overrides: BTreeMap<String, Dimension> = BTreeMap::new();
        for rule in &patch.rules {
            for dim in &current {
                if rule.applies_to(dim) {
                    overrides.insert(dim.name.clone(), rule.apply(dim));
                }
            }
        }

        for dim in current.iter_mut() {
            if let Some(patched) = overrides.remove(&dim.name) {
                *dim = patched;
            }
        }
    }

    current
}

/// Computes the Cartesian product of `dims`' values, last dimension fastest,
/// and turns each tuple into a [`TestCase`].
fn expand_test(test_name: &str, dims: &[Dimension]) -> Vec<TestCase> {
    if dims.is_empty() {
        return vec![TestCase::new(test_name, Vec::new())];
    }

    let per_dimension: Vec<Vec<(String, String)>> = dims
        .iter()
        .map(|dim| {
            dim.values
                .iter()
                .map(|v| (dim.name.clone(), v.clone()))
                .collect()
        })
        .collect();

    per_dimension
        .into_iter()
        .multi_cartesian_product()
        .map(|bindings| TestCase::new(test_name, bindings))
        .collect()
}
