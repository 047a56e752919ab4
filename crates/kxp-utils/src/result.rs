//! Extensions for the [`Result`] type.

use std::io;

use crate::private::Sealed;

/// Extensions for the [`Result`] type.
#[allow(private_bounds)]
pub trait ResultEx<T, E>: Sealed {
    /// Ignores the subset of the error for which `check` returns true,
    /// returning `Default::default()` instead.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::fs;
    /// use kxp_utils::result::{ResultEx, io_already_exists};
    /// fs::create_dir("foo").ignore_default(io_already_exists)?;
    /// fs::create_dir("foo").ignore_default(io_already_exists)?; // second time doesn't fail
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    fn ignore_default<F>(self, check: F) -> Result<T, E>
    where
        T: Default,
        F: FnOnce(&E) -> bool;
}

impl<T, E> ResultEx<T, E> for Result<T, E> {
    fn ignore_default<F>(self, check: F) -> Result<T, E>
    where
        T: Default,
        F: FnOnce(&E) -> bool,
    {
        match self {
            Err(err) if check(&err) => Ok(T::default()),
            x => x,
        }
    }
}

/// A check for [`ResultEx`] methods which ignores [`io::ErrorKind::AlreadyExists`].
pub fn io_already_exists(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::AlreadyExists
}
