use serde::{Deserialize, Serialize};

use super::company::Company;
use super::validation::{check_equity, check_length, check_non_negative, finish};

/// A job row as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// `GET /jobs/:id` payload: the job with its company inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
    pub company: Company,
}

/// POST /jobs body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_length("title", &self.title, 1, 255, &mut errors);
        check_length("companyHandle", &self.company_handle, 1, 25, &mut errors);
        if let Some(salary) = self.salary {
            check_non_negative("salary", salary, &mut errors);
        }
        if let Some(equity) = self.equity {
            check_equity("equity", equity, &mut errors);
        }
        finish(errors)
    }
}

/// PATCH /jobs/:id body.  `id` and `companyHandle` cannot change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub salary: Option<i64>,
    pub equity: Option<f64>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            check_length("title", title, 1, 255, &mut errors);
        }
        if let Some(salary) = self.salary {
            check_non_negative("salary", salary, &mut errors);
        }
        if let Some(equity) = self.equity {
            check_equity("equity", equity, &mut errors);
        }
        finish(errors)
    }
}

/// Query-string filters for `GET /jobs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    /// Case-insensitive substring match on the title.
    pub title: Option<String>,
    pub min_salary: Option<i64>,
    /// `true` restricts to jobs with non-zero equity; `false` is no filter.
    pub has_equity: bool,
}
