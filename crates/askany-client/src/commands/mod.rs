//! Actions the user can take.
//!
//! Each sub-module groups related actions by domain. Actions on a mounted
//! session are methods on [`crate::SessionClient`]; the rest are free
//! functions over an [`crate::ApiClient`].

pub mod questions;
pub mod session;
