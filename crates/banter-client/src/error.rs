//! Client error type.

use banter_core::{ConnectionError, IdentityError, SubmitError};
use thiserror::Error;

/// Errors returned by [`crate::Client`] operations.
///
/// All are local refusals; the client state is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Username rejected by the identity gate.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Session operation refused by the connection manager.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Message submission refused.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Operation needs a confirmed identity.
    #[error("no confirmed identity")]
    NoIdentity,
}
