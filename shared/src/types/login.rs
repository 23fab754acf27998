use serde::{Deserialize, Serialize};

use super::validation::{check_length, finish};

/// POST /auth/token body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

impl LoginData {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_length("username", &self.username, 1, 30, &mut errors);
        check_length("password", &self.password, 1, 20, &mut errors);
        finish(errors)
    }
}

/// `{ "token": "<jwt>" }` returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
