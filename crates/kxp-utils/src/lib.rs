//! # `kxp-utils`
//! A utility crate for `kuttl-expand`.
//!
//! This crate makes _*no stability guarantees*_ at the moment.

pub mod fs;
pub mod result;

mod private {
    pub(crate) trait Sealed {}

    impl<T, E> Sealed for Result<T, E> {}
}
