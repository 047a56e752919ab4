//! Parses the input test-definition YAML into the [model](crate::model).

use std::io::Read;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{Dimension, PatchRule, Suite, SuitePatch, TestDefinition};

/// The fully parsed, but not yet resolved, input: dimensions, test
/// definitions, and suites (including the implicit `default` suite).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMatrixInput {
    /// The declared dimensions.
    pub dimensions: Vec<Dimension>,

    /// The declared test definitions.
    pub tests: Vec<TestDefinition>,

    /// The declared suites, with the implicit `default` suite prepended.
    pub suites: Vec<Suite>,
}

/// Parses a test-definition YAML document read from `reader`.
#[tracing::instrument(skip_all)]
pub fn load<R: Read>(reader: R) -> Result<TestMatrixInput, ConfigError> {
    let raw: RawInput = serde_yaml::from_reader(reader)?;
    raw.into_input()
}

/// Parses a test-definition YAML document from a string.
pub fn load_str(input: &str) -> Result<TestMatrixInput, ConfigError> {
    let raw: RawInput = serde_yaml::from_str(input)?;
    raw.into_input()
}

#[derive(Debug, Deserialize)]
struct RawInput {
    dimensions: Vec<RawDimension>,
    tests: Vec<RawTestDefinition>,
    #[serde(default)]
    suites: Vec<RawSuite>,
}

#[derive(Debug, Deserialize)]
struct RawDimension {
    name: String,
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTestDefinition {
    name: String,
    dimensions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSuite {
    name: Option<String>,
    #[serde(default)]
    select: Vec<String>,
    #[serde(default)]
    patch: Vec<RawSuitePatch>,
}

#[derive(Debug, Deserialize)]
struct RawSuitePatch {
    test: Option<String>,
    #[serde(default)]
    dimensions: Vec<RawPatchRule>,
}

#[derive(Debug, Deserialize)]
struct RawPatchRule {
    name: Option<String>,
    expr: Option<String>,
}

impl RawInput {
    fn into_input(self) -> Result<TestMatrixInput, ConfigError> {
        let dimensions = self
            .dimensions
            .into_iter()
            .map(|d| {
                if d.values.is_empty() {
                    return Err(ConfigError::EmptyDimension { name: d.name });
                }

                Ok(Dimension::new(d.name, d.values))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tests = self
            .tests
            .into_iter()
            .map(|t| TestDefinition {
                name: t.name,
                dimension_names: t.dimensions,
            })
            .collect();

        let mut suites = vec![Suite::implicit_default()];
        for suite in self.suites {
            suites.push(suite.into_suite()?);
        }

        Ok(TestMatrixInput {
            dimensions,
            tests,
            suites,
        })
    }
}

impl RawSuite {
    fn into_suite(self) -> Result<Suite, ConfigError> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::SuiteMissingName)?;

        let patches = self
            .patch
            .into_iter()
            .map(|p| SuitePatch {
                test_name: p.test,
                rules: p
                    .dimensions
                    .into_iter()
                    .map(|r| PatchRule {
                        dimension_name: r.name,
                        expr: r.expr,
                    })
                    .collect(),
            })
            .collect();

        Ok(Suite {
            name,
            select: self.select,
            patches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_dimensions_tests_and_implicit_default_suite() {
        let input = load_str(
            r#"
dimensions:
  - name: trino
    values: ["234", "235"]
tests:
  - name: smoke
    dimensions: [trino]
"#,
        )
        .unwrap();

        assert_eq!(input.dimensions, vec![Dimension::new("trino", vec!["234".into(), "235".into()])]);
        assert_eq!(input.tests.len(), 1);
        assert_eq!(input.suites.len(), 1);
        assert_eq!(input.suites[0].name, "default");
        assert!(input.suites[0].select.is_empty());
        assert!(input.suites[0].patches.is_empty());
    }

    #[test]
    fn explicit_suites_are_appended_after_implicit_default() {
        let input = load_str(
            r#"
dimensions:
  - name: druid
    values: ["24.0", "26.0"]
tests:
  - name: smoke
    dimensions: [druid]
suites:
  - name: latest
    patch:
      - test: smoke
        dimensions:
          - name: druid
            expr: first
"#,
        )
        .unwrap();

        assert_eq!(input.suites.len(), 2);
        assert_eq!(input.suites[0].name, "default");
        assert_eq!(input.suites[1].name, "latest");
        assert_eq!(input.suites[1].patches[0].test_name.as_deref(), Some("smoke"));
    }

    #[test]
    fn empty_dimension_values_is_a_config_error() {
        let err = load_str(
            r#"
dimensions:
  - name: druid
    values: []
tests:
  - name: smoke
    dimensions: [druid]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::EmptyDimension { name } if name == "druid"));
    }

    #[test]
    fn suite_without_name_is_a_config_error() {
        let err = load_str(
            r#"
dimensions:
  - name: druid
    values: ["24.0"]
tests:
  - name: smoke
    dimensions: [druid]
suites:
  - select: [smoke]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::SuiteMissingName));
    }

    #[test]
    fn suite_with_empty_name_is_a_config_error() {
        let err = load_str(
            r#"
dimensions:
  - name: druid
    values: ["24.0"]
tests:
  - name: smoke
    dimensions: [druid]
suites:
  - name: ""
    select: [smoke]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::SuiteMissingName));
    }

    #[test]
    fn missing_required_keys_is_a_config_error() {
        let err = load_str("dimensions: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
