//! Walks a per-test template tree, classifies each file as template or
//! plain, and writes the expanded output for one [`TestCase`].

mod context;
pub mod runner_config;

use std::path::Path;
use std::{fs, io};

use minijinja::{path_loader, Environment};
use regex::Regex;

use crate::error::{ConfigError, Error, MAX_WALK_DEPTH};
use crate::lookup;
use crate::model::TestCase;
use context::TestScenarioContext;

/// Matches `.j2` and `.jinja2` file extensions.
fn jinja_suffix() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.j(inja)?2$").expect("pattern is valid"))
}

/// Expands `case`'s template tree, rooted at `template_root/<case.name>`,
/// into `target_root/<case.name>/<case.id()>`.
#[tracing::instrument(skip_all, fields(id = %case.id()))]
pub fn expand_test_case(
    case: &TestCase,
    template_root: &Path,
    target_root: &Path,
) -> Result<(), Error> {
    let case_id = case.id();
    tracing::info!(id = %case_id, "expanding test case");

    let td_root = template_root.join(&case.name);
    let tc_root = target_root.join(&case.name).join(&case_id);

    kxp_utils::fs::create_dir_all_ignore_exists(&tc_root).map_err(|e| Error::io(&tc_root, e))?;

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_loader(path_loader(&td_root));
    env.add_function("lookup", lookup::lookup);

    walk(&td_root, &td_root, &tc_root, 1, case, &env)
}

/// Depth-first pre-order walk of `current_dir`, mirroring directories under
/// `target_dir` and dispatching files to the renderer or copier.
///
/// `template_root` stays fixed across the recursion; it is used to compute a
/// file's name relative to the test's template root, which is what the
/// template engine expects when loading a template by name.
fn walk(
    template_root: &Path,
    current_dir: &Path,
    target_dir: &Path,
    depth: usize,
    case: &TestCase,
    env: &Environment,
) -> Result<(), Error> {
    if depth > MAX_WALK_DEPTH {
        return Err(Error::Config(ConfigError::DepthExceeded {
            root: template_root.to_path_buf(),
        }));
    }

    let mut entries = read_dir_entries(current_dir)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let dest = target_dir.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;

        if file_type.is_dir() {
            kxp_utils::fs::create_dir_all_ignore_exists(&dest).map_err(|e| Error::io(&dest, e))?;
            walk(template_root, &path, &dest, depth + 1, case, env)?;
            continue;
        }

        let template_name = path
            .strip_prefix(template_root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        if jinja_suffix().is_match(&entry.file_name().to_string_lossy()) {
            render_template(env, &template_name, &path, &dest, case)?;
        } else {
            kxp_utils::fs::copy_preserving_permissions(&path, &dest)
                .map_err(|e| Error::io(&dest, e))?;
        }
    }

    Ok(())
}

fn read_dir_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, Error> {
    fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))
}

/// Renders `template_name` with `case`'s bindings and writes the result to
/// `dest`, stripping the trailing `.j2`/`.jinja2` from the destination name
/// and preserving the source's permission bits.
fn render_template(
    env: &Environment,
    template_name: &str,
    src: &Path,
    dest: &Path,
    case: &TestCase,
) -> Result<(), Error> {
    tracing::debug!(template = template_name, dest = %dest.display(), "rendering template");

    let template = env
        .get_template(template_name)
        .map_err(|e| Error::render(template_name, e))?;

    let rendered = template
        .render(TestScenarioContext::new(&case.bindings))
        .map_err(|e| {
            lookup::classify_lookup_error(&e)
                .map(Error::Config)
                .unwrap_or_else(|| Error::render(template_name, e))
        })?;

    let dest_name = jinja_suffix().replace(&dest.file_name().unwrap().to_string_lossy(), "");
    let dest = dest.with_file_name(dest_name.as_ref());

    fs::write(&dest, format!("{rendered}\n")).map_err(|e| Error::io(&dest, e))?;
    kxp_utils::fs::copy_permissions(src, &dest).map_err(|e| Error::io(&dest, e))?;

    Ok(())
}

#[cfg(test)]
fn rendered_name(file_name: &str) -> String {
    jinja_suffix().replace(file_name, "").into_owned()
}

#[cfg(test)]
fn is_template(file_name: &str) -> bool {
    jinja_suffix().is_match(file_name)
}

#[cfg(test)]
mod tests {
    use std::fs;
    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    use tempdir::TempDir;

    use super::*;

    fn case(name: &str, bindings: &[(&str, &str)]) -> TestCase {
        TestCase::new(
            name,
            bindings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn rendered_name_strips_j2_and_jinja2() {
        assert_eq!(rendered_name("pod.yaml.j2"), "pod.yaml");
        assert_eq!(rendered_name("pod.yaml.jinja2"), "pod.yaml");
        assert_eq!(rendered_name("pod.yaml"), "pod.yaml");
    }

    #[test]
    fn is_template_matches_j2_suffixes_only() {
        assert!(is_template("a.j2"));
        assert!(is_template("a.jinja2"));
        assert!(!is_template("a.yaml"));
    }

    #[test]
    fn expands_templates_and_copies_plain_files_preserving_mode() {
        let dir = TempDir::new("kxp-core-expand").unwrap();
        let template_root = dir.path().join("templates");
        let target_root = dir.path().join("work");

        let test_dir = template_root.join("smoke");
        fs::create_dir_all(&test_dir).unwrap();
        fs::write(
            test_dir.join("00-assert.yaml.j2"),
            "version: {{ test_scenario.values.trino }}\n",
        )
        .unwrap();
        fs::write(test_dir.join("run.sh"), "#!/bin/sh\necho hi\n").unwrap();

        #[cfg(unix)]
        fs::set_permissions(
            test_dir.join("run.sh"),
            fs::Permissions::from_mode(0o755),
        )
        .unwrap();

        let tc = case("smoke", &[("trino", "234")]);
        expand_test_case(&tc, &template_root, &target_root).unwrap();

        let case_root = target_root.join("smoke").join("smoke_trino-234");
        let rendered = fs::read_to_string(case_root.join("00-assert.yaml")).unwrap();
        assert_eq!(rendered, "version: 234\n");

        let copied = fs::read_to_string(case_root.join("run.sh")).unwrap();
        assert_eq!(copied, "#!/bin/sh\necho hi\n");

        #[cfg(unix)]
        {
            let mode = fs::metadata(case_root.join("run.sh"))
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o755);
        }
    }

    #[test]
    fn mirrors_nested_directories() {
        let dir = TempDir::new("kxp-core-expand").unwrap();
        let template_root = dir.path().join("templates");
        let target_root = dir.path().join("work");

        let nested = template_root.join("smoke").join("00-install").join("files");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("values.yaml"), "a: 1\n").unwrap();

        let tc = case("smoke", &[]);
        expand_test_case(&tc, &template_root, &target_root).unwrap();

        let expected = target_root
            .join("smoke")
            .join("smoke")
            .join("00-install")
            .join("files")
            .join("values.yaml");
        assert_eq!(fs::read_to_string(expected).unwrap(), "a: 1\n");
    }

    #[test]
    fn depth_guard_rejects_six_levels() {
        let dir = TempDir::new("kxp-core-expand").unwrap();
        let template_root = dir.path().join("templates");
        let target_root = dir.path().join("work");

        let mut nested = template_root.join("smoke");
        for level in 0..5 {
            nested = nested.join(format!("l{level}"));
        }
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.yaml"), "a: 1\n").unwrap();

        let tc = case("smoke", &[]);
        let err = expand_test_case(&tc, &template_root, &target_root).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::DepthExceeded { .. })));
    }

    #[test]
    fn expansion_is_idempotent() {
        let dir = TempDir::new("kxp-core-expand").unwrap();
        let template_root = dir.path().join("templates");
        let target_root = dir.path().join("work");

        let test_dir = template_root.join("smoke");
        fs::create_dir_all(&test_dir).unwrap();
        fs::write(test_dir.join("a.yaml.j2"), "x: {{ test_scenario.values.v }}\n").unwrap();

        let tc = case("smoke", &[("v", "1")]);
        expand_test_case(&tc, &template_root, &target_root).unwrap();
        expand_test_case(&tc, &template_root, &target_root).unwrap();

        let out = target_root.join("smoke").join("smoke_v-1").join("a.yaml");
        assert_eq!(fs::read_to_string(out).unwrap(), "x: 1\n");
    }

    #[test]
    fn lookup_hook_reads_environment() {
        let dir = TempDir::new("kxp-core-expand").unwrap();
        let template_root = dir.path().join("templates");
        let target_root = dir.path().join("work");

        let test_dir = template_root.join("smoke");
        fs::create_dir_all(&test_dir).unwrap();
        fs::write(
            test_dir.join("a.yaml.j2"),
            "home: {{ lookup('env', 'KXP_EXPAND_TEST_HOME') }}\n",
        )
        .unwrap();

        // SAFETY: single-threaded test.
        unsafe {
            std::env::set_var("KXP_EXPAND_TEST_HOME", "/tmp/kxp");
        }

        let tc = case("smoke", &[]);
        expand_test_case(&tc, &template_root, &target_root).unwrap();

        unsafe {
            std::env::remove_var("KXP_EXPAND_TEST_HOME");
        }

        let out = target_root.join("smoke").join("smoke").join("a.yaml");
        assert_eq!(fs::read_to_string(out).unwrap(), "home: /tmp/kxp\n");
    }

    #[test]
    fn lookup_hook_rejects_non_env_domain() {
        let dir = TempDir::new("kxp-core-expand").unwrap();
        let template_root = dir.path().join("templates");
        let target_root = dir.path().join("work");

        let test_dir = template_root.join("smoke");
        fs::create_dir_all(&test_dir).unwrap();
        fs::write(
            test_dir.join("a.yaml.j2"),
            "home: {{ lookup('vault', 'secret') }}\n",
        )
        .unwrap();

        let tc = case("smoke", &[]);
        let err = expand_test_case(&tc, &template_root, &target_root).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidLookupDomain { domain }) if domain == "vault"
        ));
    }
}
