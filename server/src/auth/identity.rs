use hyper::Request;
use hyper::header::{AUTHORIZATION, HeaderMap};
use tracing::{debug, warn};

use super::UserIdentity;
use super::token::{TokenCodec, now_unix};

/// Who is making the current request.
///
/// Built fresh for every request from the presented token and stored in the
/// request extensions; it is never cached between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(UserIdentity),
}

impl Identity {
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.  Anything else (other schemes,
/// missing token, trailing junk) is treated as "no token".
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();

    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(token)
}

/// Work out the caller's identity from request headers at time `now`.
///
/// Never fails: an absent header is anonymous, and so is a token that does
/// not decode.  Requiring a real identity is the job of the gates.
pub fn resolve_identity(headers: &HeaderMap, codec: &TokenCodec, now: u64) -> Identity {
    let Some(token) = bearer_token(headers) else {
        return Identity::Anonymous;
    };

    match codec.decode_at(token, now) {
        Ok(user) => {
            debug!("Request authenticated as {}", user.username);
            Identity::User(user)
        }
        Err(e) => {
            warn!("Ignoring bearer token, continuing as anonymous: {}", e);
            Identity::Anonymous
        }
    }
}

/// Identity middleware: resolve the caller and attach the result to the
/// request so gates and handlers can read it with [`current_identity`].
pub fn attach_identity<B>(req: &mut Request<B>, codec: &TokenCodec) -> Identity {
    let identity = resolve_identity(req.headers(), codec, now_unix());
    req.extensions_mut().insert(identity.clone());
    identity
}

/// The identity attached by [`attach_identity`], or anonymous if the
/// middleware has not run.
pub fn current_identity<B>(req: &Request<B>) -> Identity {
    req.extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::DEFAULT_TOKEN_LIFETIME;
    use hyper::header::HeaderValue;

    const T0: u64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"identity-tests-identity-tests-1234", DEFAULT_TOKEN_LIFETIME)
    }

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(bearer_token(&headers_with("Basic dTE6cHc=")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Bearer a b")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn no_header_is_anonymous() {
        assert_eq!(resolve_identity(&HeaderMap::new(), &codec(), T0), Identity::Anonymous);
    }

    #[test]
    fn valid_token_yields_user() {
        let c = codec();
        let token = c.issue_at(&UserIdentity::new("u1", true), T0).unwrap();
        let identity = resolve_identity(&headers_with(&format!("Bearer {}", token)), &c, T0);
        assert_eq!(identity, Identity::User(UserIdentity::new("u1", true)));
        assert!(identity.is_admin());
    }

    #[test]
    fn bad_or_expired_token_falls_back_to_anonymous() {
        let c = codec();
        let token = c.issue_at(&UserIdentity::new("u1", true), T0).unwrap();
        let expired_at = T0 + DEFAULT_TOKEN_LIFETIME.as_secs() + 1;

        let expired = resolve_identity(&headers_with(&format!("Bearer {}", token)), &c, expired_at);
        let garbage = resolve_identity(&headers_with("Bearer garbage"), &c, T0);

        assert!(expired.is_anonymous());
        assert!(garbage.is_anonymous());
    }

    #[test]
    fn attach_identity_stores_in_extensions() {
        let c = codec();
        let token = c.issue(&UserIdentity::new("u2", false)).unwrap();
        let mut req = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(())
            .unwrap();

        assert!(current_identity(&req).is_anonymous());
        attach_identity(&mut req, &c);
        assert_eq!(current_identity(&req).user().unwrap().username, "u2");
    }
}
