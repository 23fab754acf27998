pub mod company;
pub mod job;
pub mod json_error;
pub mod jwt;
pub mod login;
pub mod register;
pub mod server_config;
pub mod user;
pub mod validation;

pub use self::company::{Company, CompanyDetail, CompanyFilter, CompanyUpdate, JobSummary, NewCompany};
pub use self::job::{Job, JobDetail, JobFilter, JobUpdate, NewJob};
pub use self::json_error::ErrorResponse;
pub use self::jwt::JwtClaims;
pub use self::login::{LoginData, TokenResponse};
pub use self::register::RegistrationData;
pub use self::user::{NewUser, User, UserDetail, UserUpdate};
