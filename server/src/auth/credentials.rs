use std::future::Future;
use std::sync::LazyLock;

use tracing::{debug, warn};

use super::{AuthError, UserIdentity};
use crate::database::utils::{hash_password, verify_password};

/// What the data layer hands back for a username: the stored hash and the
/// admin flag.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Read-only access to stored credentials.
pub trait CredentialStore {
    fn find_credential_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = anyhow::Result<Option<StoredCredential>>> + Send;
}

/// Hash checked against when the username does not exist, so an unknown
/// account costs the same argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-password").ok());

/// Run argon2 verification on the blocking pool; it is too slow for an
/// async worker thread.
async fn verify_off_thread(hash: Option<String>, password: &str) -> anyhow::Result<bool> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&hash, &password),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(dummy, &password);
            }
            Ok(false)
        }
    })
    .await
    .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))?
}

/// Check `password` for `username` and return the verified identity.
///
/// Unknown user and wrong password both yield
/// [`AuthError::Authentication`].
pub async fn verify_credentials<S>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<UserIdentity, AuthError>
where
    S: CredentialStore,
{
    let stored = store
        .find_credential_by_username(username)
        .await
        .map_err(AuthError::Lookup)?;

    let Some(stored) = stored else {
        verify_off_thread(None, password)
            .await
            .map_err(AuthError::Lookup)?;
        warn!("Login failed: unknown user {}", username);
        return Err(AuthError::Authentication);
    };

    let valid = verify_off_thread(Some(stored.password_hash.clone()), password)
        .await
        .map_err(AuthError::Lookup)?;
    if !valid {
        warn!("Login failed: wrong password for {}", username);
        return Err(AuthError::Authentication);
    }

    debug!("Credentials verified for {}", stored.username);
    Ok(UserIdentity {
        username: stored.username,
        is_admin: stored.is_admin,
    })
}
