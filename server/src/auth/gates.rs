//! Authorization gates.
//!
//! Each gate is a pure check over the request's [`Identity`].  The router
//! evaluates a route's gates in order after the identity middleware and
//! before the handler; the first failure short-circuits with
//! [`AuthError::Unauthorized`] and the handler never runs.

use std::collections::HashMap;

use tracing::warn;

use super::{AuthError, Identity, UserIdentity};

/// A precondition attached to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    LoggedIn,
    Admin,
    /// Admin, or the user named by the given path parameter
    /// (e.g. `"username"` for `/users/:username`).
    AdminOrSelf(&'static str),
}

impl Gate {
    pub fn check(
        &self,
        identity: &Identity,
        params: &HashMap<String, String>,
    ) -> Result<(), AuthError> {
        match self {
            Self::LoggedIn => require_logged_in(identity).map(|_| ()),
            Self::Admin => require_admin(identity).map(|_| ()),
            Self::AdminOrSelf(param) => match params.get(*param) {
                Some(owner) => require_admin_or_self(identity, owner).map(|_| ()),
                None => {
                    warn!("Gate references missing path parameter :{}", param);
                    Err(AuthError::Unauthorized)
                }
            },
        }
    }
}

/// Run `gates` in order, stopping at the first failure.
pub fn check_all(
    gates: &[Gate],
    identity: &Identity,
    params: &HashMap<String, String>,
) -> Result<(), AuthError> {
    gates.iter().try_for_each(|gate| gate.check(identity, params))
}

pub fn require_logged_in(identity: &Identity) -> Result<&UserIdentity, AuthError> {
    identity.user().ok_or(AuthError::Unauthorized)
}

pub fn require_admin(identity: &Identity) -> Result<&UserIdentity, AuthError> {
    let user = require_logged_in(identity)?;
    if !user.is_admin {
        warn!("Non-admin user {} attempted an admin operation", user.username);
        return Err(AuthError::Unauthorized);
    }
    Ok(user)
}

pub fn require_admin_or_self<'a>(
    identity: &'a Identity,
    owner: &str,
) -> Result<&'a UserIdentity, AuthError> {
    let user = require_logged_in(identity)?;
    if !user.is_admin && user.username != owner {
        warn!("User {} attempted to act on {}", user.username, owner);
        return Err(AuthError::Unauthorized);
    }
    Ok(user)
}
