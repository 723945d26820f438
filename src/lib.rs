//! Remote control for GitHub Actions workflows.
//!
//! The crate talks to the GitHub REST API to push workflow definition files, dispatch
//! workflow runs, and enable, disable, inspect or enumerate workflows. The binary
//! `actions-remote` is a thin command layer over [`operation::execute`].

pub mod client;
pub mod contents;
pub mod env;
pub mod error;
pub mod operation;
pub mod repository;
pub mod workflow;

pub use error::{ApiError, Error, Result};

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// # use actions_remote::static_lazy_lock;
/// # use std::sync::LazyLock;
/// static_lazy_lock! {
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: LazyLock<String> = LazyLock::new(|| String::from("a static variable"));
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
