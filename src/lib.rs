//! Retrieves the packaged release of a commit from GitHub Actions.
//!
//! A retrieval locates the deploy workflow run of a commit, waits for it to finish, checks that it
//! succeeded, and downloads every artifact it produced.
//!
//! See: [`retrieve`], [`transactions`]

pub mod env;
pub mod error;
pub mod framework;
pub mod github;
pub mod retrieve;
pub mod shutdown;
pub mod transactions;
pub mod workflow;

pub use error::{Error, Result};
pub use retrieve::{RetrievalRequest, retrieve};

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// use packaged_release::static_lazy_lock;
///
/// static_lazy_lock! {
///     pub VAR: String = String::from("a static variable");
/// }
///
/// assert_eq!(*VAR, "a static variable");
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
