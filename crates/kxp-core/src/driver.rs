//! Orchestrates a full expansion: load the test definition, resolve one
//! suite, sanity-check the filesystem layout, then expand the runner config
//! and every test case onto disk.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Error};
use crate::expand::runner_config::{ensure_runner_config_template_exists, expand_runner_config};
use crate::expand::expand_test_case;
use crate::loader::{self, TestMatrixInput};
use crate::model::EffectiveSuite;
use crate::resolver;

/// The filesystem locations [`run`] reads from and writes to.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// The test-definition YAML file.
    pub test_definition: PathBuf,

    /// The root directory containing one subdirectory per test definition.
    pub template_dir: PathBuf,

    /// The directory expanded test cases are written under. The tool creates
    /// a `tests` subdirectory beneath it.
    pub output_dir: PathBuf,

    /// The kuttl runner config template.
    pub kuttl_test: PathBuf,

    /// The suite to expand.
    pub suite: String,
}

impl DriverConfig {
    /// The directory test cases are expanded into: `<output_dir>/tests`.
    pub fn target_root(&self) -> PathBuf {
        self.output_dir.join("tests")
    }
}

/// Loads, resolves, and expands one suite onto disk, per `config`.
///
/// This is the single entry point the CLI drives; everything it does is pure
/// filesystem/template work with no process-level concerns (logging setup,
/// exit codes) of its own.
#[tracing::instrument(skip_all, fields(suite = %config.suite))]
pub fn run(config: &DriverConfig) -> Result<EffectiveSuite, Error> {
    let input = load_input(&config.test_definition)?;
    let suite = resolve_suite(&input, &config.suite)?;

    ensure_runner_config_template_exists(&config.kuttl_test)?;
    check_template_dirs(&config.template_dir, &suite)?;

    let target_root = config.target_root();
    kxp_utils::fs::create_dir_all_ignore_exists(&target_root)
        .map_err(|e| Error::io(&target_root, e))?;

    expand_runner_config(&suite, &target_root, &config.kuttl_test)?;

    tracing::info!(cases = suite.test_cases.len(), "expanding test cases");
    for case in &suite.test_cases {
        expand_test_case(case, &config.template_dir, &target_root)?;
    }

    Ok(suite)
}

fn load_input(test_definition: &Path) -> Result<TestMatrixInput, Error> {
    let file = std::fs::File::open(test_definition).map_err(|e| Error::io(test_definition, e))?;
    loader::load(file).map_err(Error::Config)
}

fn resolve_suite(input: &TestMatrixInput, name: &str) -> Result<EffectiveSuite, Error> {
    resolver::resolve(input)
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::Config(ConfigError::UnknownSuite { name: name.to_owned() }))
}

/// Confirms that every distinct test name in `suite` has a corresponding
/// directory under `template_dir`.
fn check_template_dirs(template_dir: &Path, suite: &EffectiveSuite) -> Result<(), Error> {
    for name in suite.distinct_test_names() {
        let dir = template_dir.join(name);
        match dir.metadata() {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(Error::Config(ConfigError::MissingTemplateDir { path: dir }));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempdir::TempDir;

    use super::*;

    fn write_fixture(root: &Path) -> DriverConfig {
        let test_definition = root.join("test-definition.yaml");
        fs::write(
            &test_definition,
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

        let template_dir = root.join("templates");
        let smoke_dir = template_dir.join("smoke");
        fs::create_dir_all(&smoke_dir).unwrap();
        fs::write(
            smoke_dir.join("00-assert.yaml.j2"),
            "version: {{ test_scenario.values.trino }}\n",
        )
        .unwrap();

        let kuttl_test = root.join("kuttl-test.yaml.jinja2");
        fs::write(
            &kuttl_test,
            "testDirs:\n{% for t in testinput.tests %}  - tests/{{ t.name }}\n{% endfor %}",
        )
        .unwrap();

        DriverConfig {
            test_definition,
            template_dir,
            output_dir: root.join("_work"),
            kuttl_test,
            suite: "default".to_owned(),
        }
    }

    #[test]
    fn runs_full_expansion_for_default_suite() {
        let dir = TempDir::new("kxp-core-driver").unwrap();
        let config = write_fixture(dir.path());

        let suite = run(&config).unwrap();
        assert_eq!(suite.test_cases.len(), 2);

        let case_dir = config.target_root().join("smoke").join("smoke_trino-234");
        assert!(case_dir.join("00-assert.yaml").exists());

        let rendered_runner_config = dir.path().join("_work").join("kuttl-test.yaml");
        assert!(rendered_runner_config.exists());
    }

    #[test]
    fn unknown_suite_is_a_config_error() {
        let dir = TempDir::new("kxp-core-driver").unwrap();
        let mut config = write_fixture(dir.path());
        config.suite = "nonexistent".to_owned();

        let err = run(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::UnknownSuite { .. })));
    }

    #[test]
    fn missing_template_dir_is_a_config_error() {
        let dir = TempDir::new("kxp-core-driver").unwrap();
        let config = write_fixture(dir.path());
        fs::remove_dir_all(config.template_dir.join("smoke")).unwrap();

        let err = run(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingTemplateDir { .. })));
    }

    #[test]
    fn missing_runner_config_template_is_a_config_error() {
        let dir = TempDir::new("kxp-core-driver").unwrap();
        let config = write_fixture(dir.path());
        fs::remove_file(&config.kuttl_test).unwrap();

        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingRunnerConfigTemplate { .. })
        ));
    }
}
