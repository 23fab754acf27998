//! Identity and authorization.
//!
//! Request flow:
//!
//!   1. [`identity::attach_identity`] runs on every request.  It decodes the
//!      bearer token, if any, and stores an [`Identity`] in the request
//!      extensions.  A missing, malformed or expired token yields
//!      `Identity::Anonymous`; it never fails the request.
//!   2. [`gates`] run next, strictly before the handler.  They are the only
//!      place an authorization failure is raised.
//!   3. Login/registration go through [`credentials::verify_credentials`]
//!      and [`token::TokenCodec::issue`].

pub mod credentials;
pub mod error;
pub mod gates;
pub mod identity;
pub mod token;

pub use credentials::{CredentialStore, StoredCredential, verify_credentials};
pub use error::AuthError;
pub use gates::{Gate, require_admin, require_admin_or_self, require_logged_in};
pub use identity::{Identity, attach_identity, current_identity, resolve_identity};
pub use token::{DEFAULT_TOKEN_LIFETIME, TokenCodec};

/// The identity carried inside a token: who the caller is and whether they
/// are an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub username: String,
    pub is_admin: bool,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
        }
    }
}
