//! Renders the top-level runner config template once per suite expansion.

use std::fs;
use std::path::Path;

use minijinja::{path_loader, Environment};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Error};
use crate::model::EffectiveSuite;
use crate::expand::jinja_suffix;

/// Renders `runner_config_template` with the distinct test names in `suite`
/// and writes the result next to `target_root`'s parent, using the same
/// filename with the trailing `.j2`/`.jinja2` suffix stripped.
///
/// `target_root` is, by convention, a directory named `tests`; the runner
/// config is written one level above it.
#[tracing::instrument(skip_all, fields(suite = %suite.name))]
pub fn expand_runner_config(
    suite: &EffectiveSuite,
    target_root: &Path,
    runner_config_template: &Path,
) -> Result<(), Error> {
    let Some(template_dir) = runner_config_template.parent() else {
        return Err(Error::Config(ConfigError::MissingRunnerConfigTemplate {
            path: runner_config_template.to_path_buf(),
        }));
    };

    let template_name = runner_config_template
        .file_name()
        .ok_or_else(|| {
            Error::Config(ConfigError::MissingRunnerConfigTemplate {
                path: runner_config_template.to_path_buf(),
            })
        })?
        .to_string_lossy()
        .into_owned();

    let mut env = Environment::new();
    env.set_loader(path_loader(template_dir));

    let template = env
        .get_template(&template_name)
        .map_err(|e| Error::render(&template_name, e))?;

    let rendered = template
        .render(RunnerConfigContext::new(&suite.distinct_test_names()))
        .map_err(|e| Error::render(&template_name, e))?;

    let dest_name = jinja_suffix().replace(&template_name, "");
    let dest = target_root
        .parent()
        .unwrap_or(target_root)
        .join(dest_name.as_ref());

    tracing::debug!(dest = %dest.display(), "writing runner config");
    write_file(&dest, &rendered)
}

fn write_file(dest: &Path, contents: &str) -> Result<(), Error> {
    fs::write(dest, format!("{contents}\n")).map_err(|e| Error::io(dest, e))
}

/// `{ "testinput": { "tests": [ { "name": <distinct test name> }, ... ] } }`.
struct RunnerConfigContext<'a> {
    test_names: &'a [&'a str],
}

impl<'a> RunnerConfigContext<'a> {
    fn new(test_names: &'a [&'a str]) -> Self {
        Self { test_names }
    }
}

impl Serialize for RunnerConfigContext<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut outer = serializer.serialize_map(Some(1))?;
        outer.serialize_entry("testinput", &TestInput { test_names: self.test_names })?;
        outer.end()
    }
}

struct TestInput<'a> {
    test_names: &'a [&'a str],
}

impl Serialize for TestInput<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut outer = serializer.serialize_map(Some(1))?;
        let tests: Vec<_> = self
            .test_names
            .iter()
            .map(|name| TestEntry { name: *name })
            .collect();
        outer.serialize_entry("tests", &tests)?;
        outer.end()
    }
}

#[derive(Serialize)]
struct TestEntry<'a> {
    name: &'a str,
}

/// Confirms `path` exists and is a file, failing with a configuration error
/// otherwise.
pub fn ensure_runner_config_template_exists(path: &Path) -> Result<(), Error> {
    match path.metadata() {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) | Err(_) => Err(Error::Config(ConfigError::MissingRunnerConfigTemplate {
            path: path.to_path_buf(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempdir::TempDir;

    use crate::model::TestCase;

    use super::*;

    #[test]
    fn renders_distinct_test_names_in_first_seen_order() {
        let dir = TempDir::new("kxp-core-runner-config").unwrap();
        let template_dir = dir.path().join("tests");
        fs::create_dir_all(&template_dir).unwrap();

        let template_path = template_dir.join("kuttl-test.yaml.jinja2");
        fs::write(
            &template_path,
            "tests:\n{% for t in testinput.tests %}  - {{ t.name }}\n{% endfor %}",
        )
        .unwrap();

        let target_root = dir.path().join("_work").join("tests");
        fs::create_dir_all(&target_root).unwrap();

        let suite = EffectiveSuite {
            name: "default".into(),
            test_cases: vec![
                TestCase::new("smoke", vec![]),
                TestCase::new("resources", vec![]),
                TestCase::new("smoke", vec![]),
            ],
        };

        expand_runner_config(&suite, &target_root, &template_path).unwrap();

        let dest = dir.path().join("_work").join("kuttl-test.yaml");
        let rendered = fs::read_to_string(dest).unwrap();
        assert_eq!(rendered, "tests:\n  - smoke\n  - resources\n\n");
    }

    #[test]
    fn missing_template_is_a_config_error() {
        let dir = TempDir::new("kxp-core-runner-config").unwrap();
        let missing = dir.path().join("nope.yaml.j2");
        let err = ensure_runner_config_template_exists(&missing).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingRunnerConfigTemplate { .. })));
    }
}
