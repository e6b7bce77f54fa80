//! Failure classes surfaced by the CLI.
//!
//! Most errors travel as plain `anyhow::Error` chains. The two types here mark
//! the ends of the spectrum that need different rendering at the top level:
//! a [`UserError`] is something the caller can fix (missing worker name, no
//! uploaded versions), while a [`FatalError`] means the API broke its own
//! contract (a multipart content response without entrypoint metadata) and no
//! amount of caller action will help.

use thiserror::Error;

/// An actionable mistake on the caller's side. Rendered without internals.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UserError(pub String);

/// A contract violation by the remote API. Rendered as an internal error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FatalError(pub String);
