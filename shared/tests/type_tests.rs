/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; unit tests tightly coupled to private
/// helpers live inside the modules themselves (see the `#[cfg(test)]` block
/// in `validation.rs`).
// ---------------------------------------------------------------------------
// JWT claims
// ---------------------------------------------------------------------------
#[cfg(test)]
mod jwt_tests {
    use shared::types::*;

    fn sample_claims() -> JwtClaims {
        JwtClaims {
            username: "alice".to_string(),
            is_admin: false,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    #[test]
    fn claims_json_contains_expected_keys() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        for key in &["username", "is_admin", "iat", "exp"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
    }

    #[test]
    fn admin_claims_carry_is_admin_true() {
        let mut c = sample_claims();
        c.is_admin = true;
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["is_admin"], true);
    }

    #[test]
    fn claims_missing_admin_flag_are_rejected() {
        let json = r#"{"username":"alice","iat":1,"exp":2}"#;
        assert!(serde_json::from_str::<JwtClaims>(json).is_err());
    }
}

// ---------------------------------------------------------------------------
// Login / register
// ---------------------------------------------------------------------------
#[cfg(test)]
mod login_tests {
    use shared::types::*;

    #[test]
    fn login_data_parses() {
        let data: LoginData =
            serde_json::from_str(r#"{"username":"u1","password":"password1"}"#).unwrap();
        assert_eq!(data.username, "u1");
        assert!(data.validate().is_ok());
    }

    #[test]
    fn login_data_rejects_unknown_fields() {
        let res = serde_json::from_str::<LoginData>(
            r#"{"username":"u1","password":"password1","isAdmin":true}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn login_data_requires_password() {
        assert!(serde_json::from_str::<LoginData>(r#"{"username":"u1"}"#).is_err());
    }

    #[test]
    fn empty_username_fails_validation() {
        let data = LoginData {
            username: String::new(),
            password: "pw".to_string(),
        };
        let errs = data.validate().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("username"));
    }

    #[test]
    fn token_response_serializes_single_key() {
        let json = serde_json::to_value(TokenResponse {
            token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "token": "abc" }));
    }

    #[test]
    fn registration_uses_camel_case() {
        let data: RegistrationData = serde_json::from_str(
            r#"{"username":"new","password":"password","firstName":"First",
                "lastName":"Last","email":"new@email.com"}"#,
        )
        .unwrap();
        assert_eq!(data.first_name, "First");
        assert!(data.validate().is_ok());
    }

    #[test]
    fn registration_cannot_request_admin() {
        let res = serde_json::from_str::<RegistrationData>(
            r#"{"username":"new","password":"password","firstName":"First",
                "lastName":"Last","email":"new@email.com","isAdmin":true}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn registration_reports_every_problem() {
        let data = RegistrationData {
            username: "has space".to_string(),
            password: "pw".to_string(),
            first_name: String::new(),
            last_name: "Last".to_string(),
            email: "not-an-email".to_string(),
        };
        let errs = data.validate().unwrap_err();
        assert!(errs.len() >= 4, "{:?}", errs);
    }
}

// ---------------------------------------------------------------------------
// Companies / jobs / users
// ---------------------------------------------------------------------------
#[cfg(test)]
mod record_tests {
    use shared::types::*;

    #[test]
    fn company_serializes_camel_case() {
        let c = Company {
            handle: "c1".to_string(),
            name: "C1".to_string(),
            description: "Desc1".to_string(),
            num_employees: Some(1),
            logo_url: Some("http://c1.img".to_string()),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["numEmployees"], 1);
        assert_eq!(json["logoUrl"], "http://c1.img");
    }

    #[test]
    fn company_detail_flattens_company_fields() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".to_string(),
                name: "C1".to_string(),
                description: "Desc1".to_string(),
                num_employees: None,
                logo_url: None,
            },
            jobs: vec![JobSummary {
                id: 7,
                title: "J1".to_string(),
                salary: Some(100),
                equity: Some(0.1),
            }],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["handle"], "c1");
        assert_eq!(json["jobs"][0]["id"], 7);
    }

    #[test]
    fn new_company_rejects_bad_logo_and_negative_size() {
        let c: NewCompany = serde_json::from_str(
            r#"{"handle":"new","name":"New","description":"d",
                "numEmployees":-1,"logoUrl":"not-a-url"}"#,
        )
        .unwrap();
        assert_eq!(c.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn company_update_rejects_handle_change() {
        let res = serde_json::from_str::<CompanyUpdate>(r#"{"handle":"c1-new"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn company_filter_min_over_max_is_invalid() {
        let f = CompanyFilter {
            name: None,
            min_employees: Some(10),
            max_employees: Some(1),
        };
        assert!(f.validate().is_err());
        let ok = CompanyFilter {
            min_employees: Some(1),
            max_employees: Some(1),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn new_job_equity_out_of_range() {
        let j: NewJob = serde_json::from_str(
            r#"{"title":"J","salary":10,"equity":1.5,"companyHandle":"c1"}"#,
        )
        .unwrap();
        assert!(j.validate().is_err());
    }

    #[test]
    fn job_update_cannot_move_company() {
        let res = serde_json::from_str::<JobUpdate>(r#"{"companyHandle":"c2"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn user_update_is_all_optional() {
        let u: UserUpdate = serde_json::from_str(r#"{"firstName":"New"}"#).unwrap();
        assert_eq!(u.first_name.as_deref(), Some("New"));
        assert!(u.password.is_none());
        assert!(u.validate().is_ok());
    }

    #[test]
    fn user_detail_lists_applications() {
        let detail = UserDetail {
            user: User {
                username: "u1".to_string(),
                first_name: "U1F".to_string(),
                last_name: "U1L".to_string(),
                email: "user1@user.com".to_string(),
                is_admin: false,
            },
            applications: vec![1, 2],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["isAdmin"], false);
        assert_eq!(json["applications"], serde_json::json!([1, 2]));
        assert!(json.get("password").is_none());
    }
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------
#[cfg(test)]
mod json_error_tests {
    use shared::types::ErrorResponse;

    #[test]
    fn error_response_status_is_error() {
        let e = ErrorResponse::new("UNAUTHORIZED", "Unauthorized");
        assert_eq!(e.status, "error");
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn validation_errors_are_listed() {
        let e = ErrorResponse::new("BAD_REQUEST", "Invalid request body")
            .with_errors(vec!["name must be at least 1 characters".to_string()]);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["errors"][0], "name must be at least 1 characters");
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------
#[cfg(test)]
mod config_tests {
    use shared::config::{load_config, parse_config};
    use shared::types::server_config::ConfigError;
    use std::io::Write;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn env_secret_set() -> bool {
        std::env::var("JWT_SECRET").is_ok_and(|s| !s.is_empty())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = parse_config(&format!("[auth]\njwt_secret = \"{}\"\n", SECRET)).unwrap();
        assert_eq!(cfg.server.addr(), "127.0.0.1:3001");
        assert_eq!(cfg.auth.token_expiry_hours, 24);
        assert_eq!(cfg.auth.token_expiry_secs(), 86_400);
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(
            parse_config("   \n"),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_expiry_is_rejected() {
        let doc = format!("[auth]\njwt_secret = \"{}\"\ntoken_expiry_hours = 0\n", SECRET);
        assert!(matches!(
            parse_config(&doc),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversized_expiry_is_rejected() {
        let doc = format!(
            "[auth]\njwt_secret = \"{}\"\ntoken_expiry_hours = 9000000000000000000\n",
            SECRET
        );
        assert!(matches!(
            parse_config(&doc),
            Err(ConfigError::InvalidConfig(_))
        ));

        let one_year = format!("[auth]\njwt_secret = \"{}\"\ntoken_expiry_hours = 8760\n", SECRET);
        assert_eq!(parse_config(&one_year).unwrap().auth.token_expiry_secs(), 8760 * 3600);
    }

    #[test]
    fn short_secret_is_rejected() {
        if env_secret_set() {
            return;
        }
        assert!(parse_config("[auth]\njwt_secret = \"short\"\n").is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            parse_config("[auth\n"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[server]\nbind = \"0.0.0.0\"\nport = 8080\n\n[auth]\njwt_secret = \"{}\"\n",
            SECRET
        )
        .unwrap();
        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_config("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
