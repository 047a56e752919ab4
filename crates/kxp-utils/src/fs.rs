//! Helper functions for filesystem interactions used by the template-tree
//! expander.

use std::path::Path;
use std::{fs, io};

use crate::result::{io_already_exists, ResultEx};

/// Creates a directory and all of its parents, but doesn't fail if it already
/// exists.
///
/// # Example
/// ```no_run
/// # use kxp_utils::fs::create_dir_all_ignore_exists;
/// create_dir_all_ignore_exists("foo/bar")?;
/// create_dir_all_ignore_exists("foo/bar")?; // second time doesn't fail
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn create_dir_all_ignore_exists<P>(path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    fn inner(path: &Path) -> io::Result<()> {
        tracing::debug!(?path, "creating directory");
        fs::create_dir_all(path).ignore_default(io_already_exists)
    }

    inner(path.as_ref())
}

/// Copies `src` to `dst`, then sets `dst`'s permission bits to match `src`'s.
///
/// This is used for plain (non-template) files in a template tree, where
/// preserving the executable bit matters because some expanded files are
/// shell scripts run by the downstream test runner.
pub fn copy_preserving_permissions<P, Q>(src: P, dst: Q) -> io::Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    fn inner(src: &Path, dst: &Path) -> io::Result<()> {
        tracing::debug!(?src, ?dst, "copying file");
        fs::copy(src, dst)?;
        copy_permissions(src, dst)
    }

    inner(src.as_ref(), dst.as_ref())
}

/// Sets `dst`'s permission bits to match `src`'s.
pub fn copy_permissions<P, Q>(src: P, dst: Q) -> io::Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    fn inner(src: &Path, dst: &Path) -> io::Result<()> {
        let permissions = fs::metadata(src)?.permissions();
        tracing::debug!(?dst, "updating file mode");
        fs::set_permissions(dst, permissions)
    }

    inner(src.as_ref(), dst.as_ref())
}
