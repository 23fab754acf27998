use serde::{Deserialize, Serialize};

use super::validation::{check_length, check_non_negative, check_url, finish};

/// A company row as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

/// Job listing as embedded in a company detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
}

/// `GET /companies/:handle` payload: the company plus its open jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

/// POST /companies body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i64>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_length("handle", &self.handle, 1, 25, &mut errors);
        if !self
            .handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.push("handle may only contain letters, digits, '-' and '_'".to_string());
        }
        check_length("name", &self.name, 1, 255, &mut errors);
        if let Some(n) = self.num_employees {
            check_non_negative("numEmployees", n, &mut errors);
        }
        if let Some(url) = &self.logo_url {
            check_url("logoUrl", url, &mut errors);
        }
        finish(errors)
    }
}

/// PATCH /companies/:handle body.  The handle itself is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_length("name", name, 1, 255, &mut errors);
        }
        if let Some(n) = self.num_employees {
            check_non_negative("numEmployees", n, &mut errors);
        }
        if let Some(url) = &self.logo_url {
            check_url("logoUrl", url, &mut errors);
        }
        finish(errors)
    }
}

/// Query-string filters for `GET /companies`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    /// Case-insensitive substring match on the company name.
    pub name: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

impl CompanyFilter {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        match (self.min_employees, self.max_employees) {
            (Some(min), Some(max)) if min > max => Err(vec![
                "minEmployees cannot be greater than maxEmployees".to_string(),
            ]),
            _ => Ok(()),
        }
    }
}
