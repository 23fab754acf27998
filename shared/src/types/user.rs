use serde::{Deserialize, Serialize};

use super::validation::{check_email, check_length, finish};

/// A user row as returned to clients.  The password hash never leaves the
/// data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// `GET /users/:username` payload: the user plus the ids of applied jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i64>,
}

/// POST /users body (admin-only account creation).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_username(&self.username, &mut errors);
        check_length("password", &self.password, 5, 20, &mut errors);
        check_length("firstName", &self.first_name, 1, 30, &mut errors);
        check_length("lastName", &self.last_name, 1, 30, &mut errors);
        check_email("email", &self.email, &mut errors);
        finish(errors)
    }
}

/// PATCH /users/:username body.
///
/// `is_admin` is accepted here but only honoured when the caller is an admin;
/// the handler rejects self-promotion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(first) = &self.first_name {
            check_length("firstName", first, 1, 30, &mut errors);
        }
        if let Some(last) = &self.last_name {
            check_length("lastName", last, 1, 30, &mut errors);
        }
        if let Some(password) = &self.password {
            check_length("password", password, 5, 20, &mut errors);
        }
        if let Some(email) = &self.email {
            check_email("email", email, &mut errors);
        }
        finish(errors)
    }
}

pub(crate) fn check_username(username: &str, errors: &mut Vec<String>) {
    check_length("username", username, 1, 30, errors);
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        errors.push("username may only contain letters, digits, '_', '-' and '.'".to_string());
    }
}
