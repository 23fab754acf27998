use serde::Deserialize;

use super::user::check_username;
use super::validation::{check_email, check_length, finish};

/// POST /auth/register body.
///
/// There is deliberately no `isAdmin` field: self-registered accounts are
/// never admins, and `deny_unknown_fields` rejects any attempt to send one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistrationData {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RegistrationData {
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
