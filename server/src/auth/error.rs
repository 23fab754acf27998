use thiserror::Error;

/// Failures raised by the identity/authorization layer.
///
/// `Authentication` and `Unauthorized` are deliberately distinct: the first
/// means a login attempt failed, the second that a gate refused an already
/// identified (or anonymous) caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.  The message is identical for
    /// both so callers cannot tell which accounts exist.
    #[error("Invalid username/password")]
    Authentication,

    /// Bad signature, malformed payload or expired token.  Only the token
    /// codec produces this; the identity middleware downgrades it to
    /// anonymous.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// The credential store could not be read.
    #[error("Credential lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
}
