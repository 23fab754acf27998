use serde::{Deserialize, Serialize};

/// Claims embedded in every bearer token issued by the server.
///
/// The token is the only carrier of identity: nothing is cached server-side,
/// so every request rebuilds its identity from these fields after the
/// signature and `exp` have been checked.  There is no revocation list;
/// expiry is the only way a token stops working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Username of the account (primary key of `users`).
    pub username: String,

    /// Whether this user had admin privileges when the token was issued.
    /// A promoted/demoted user must obtain a new token for this to change.
    pub is_admin: bool,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: u64,

    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: u64,
}
