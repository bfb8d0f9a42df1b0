//! Authentication Models
//! Mission: Accounts, role profiles and session claims

use crate::error::ApiError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Base identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub created_at: String,
}

/// Account roles; fixed at registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "student")]
    Student,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Role::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown role: {s}").into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentProfile {
    pub user_id: i64,
    pub student_name: String,
    pub student_roll: Option<String>,
    pub department: Option<String>,
    pub room_no: Option<String>,
    pub phone_number: Option<String>,
    pub email_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminProfile {
    pub user_id: i64,
    pub admin_name: String,
    pub department: Option<String>,
    pub level: Option<String>,
}

/// Role-specific extension of an account.
///
/// `Empty` serializes as `{}` and covers accounts whose profile row is missing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Profile {
    Student(StudentProfile),
    Admin(AdminProfile),
    Empty {},
}

impl Profile {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Profile::Student(p) => Some(p.student_name.as_str()),
            Profile::Admin(p) => Some(p.admin_name.as_str()),
            Profile::Empty {} => None,
        }
    }
}

/// Profile fields supplied at registration
#[derive(Debug, Clone, PartialEq)]
pub enum NewProfile {
    Student {
        name: String,
        student_roll: Option<String>,
        department: Option<String>,
        room_no: Option<String>,
        phone_number: Option<String>,
    },
    Admin {
        name: String,
        department: Option<String>,
        level: Option<String>,
    },
}

impl NewProfile {
    pub fn role(&self) -> Role {
        match self {
            NewProfile::Student { .. } => Role::Student,
            NewProfile::Admin { .. } => Role::Admin,
        }
    }
}

/// Validated registration, ready for the account store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub profile: NewProfile,
}

/// JWT claims as they travel on the wire.
///
/// Issuer and verifier share this one struct, so no consumer needs to
/// guess between `id`, `user_id` or `userId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Verified caller identity, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    pub account_id: i64,
    pub email: String,
    pub role: Role,
    pub expires_at: usize,
}

impl Session {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        let account_id = claims.sub.parse::<i64>().ok()?;
        Some(Self {
            account_id,
            email: claims.email,
            role: claims.role,
            expires_at: claims.exp,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Login request body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(self) -> Result<(String, String), ApiError> {
        match (non_blank(self.email), non_empty(self.password)) {
            (Some(email), Some(password)) => Ok((email.to_lowercase(), password)),
            _ => Err(ApiError::validation("Email and password are required")),
        }
    }
}

/// Registration request body; profile fields depend on `role`
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub student_roll: Option<String>,
    pub department: Option<String>,
    pub room_no: Option<String>,
    pub phone_number: Option<String>,
    pub level: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewAccount, ApiError> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(self.name),
            non_blank(self.email),
            non_empty(self.password),
        ) else {
            return Err(ApiError::validation(
                "Name, email and password are required",
            ));
        };

        let role = match non_blank(self.role) {
            None => Role::Student,
            Some(r) => Role::parse(&r)
                .ok_or_else(|| ApiError::validation(format!("Unknown role: {r}")))?,
        };

        let profile = match role {
            Role::Student => NewProfile::Student {
                name,
                student_roll: non_blank(self.student_roll),
                department: non_blank(self.department),
                room_no: non_blank(self.room_no),
                phone_number: non_blank(self.phone_number),
            },
            Role::Admin => NewProfile::Admin {
                name,
                department: non_blank(self.department),
                level: non_blank(self.level),
            },
        };

        Ok(NewAccount {
            email: email.to_lowercase(),
            password,
            profile,
        })
    }
}

/// Account summary returned to clients (sanitized)
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl AccountResponse {
    pub fn new(account: &Account, profile: &Profile) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
            name: profile.display_name().unwrap_or("User").to_string(),
        }
    }
}

/// Login and registration response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub user: AccountResponse,
    #[serde(rename = "roleData")]
    pub role_data: Profile,
}

// Passwords are taken verbatim; only an empty one counts as missing
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = Role::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let student: Role = serde_json::from_str(r#""student""#).unwrap();
        assert_eq!(student, Role::Student);
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Student.as_str(), "student");

        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("STUDENT"), Some(Role::Student));
        assert_eq!(Role::parse("warden"), None);
    }

    #[test]
    fn test_empty_profile_serializes_as_object() {
        let json = serde_json::to_string(&Profile::Empty {}).unwrap();
        assert_eq!(json, "{}");
        assert_eq!(Profile::Empty {}.display_name(), None);
    }

    #[test]
    fn test_session_from_claims() {
        let claims = Claims {
            sub: "42".to_string(),
            email: "a@x.com".to_string(),
            role: Role::Student,
            iat: 1,
            exp: 2,
        };
        let session = Session::from_claims(claims.clone()).unwrap();
        assert_eq!(session.account_id, 42);
        assert!(!session.is_admin());
        assert!(matches!(session.require_admin(), Err(ApiError::Forbidden)));

        let bad = Claims {
            sub: "not-a-number".to_string(),
            ..claims
        };
        assert!(Session::from_claims(bad).is_none());
    }

    #[test]
    fn test_register_defaults_to_student() {
        let req = RegisterRequest {
            name: Some("Asha".into()),
            email: Some(" A@X.com ".into()),
            password: Some("pw1".into()),
            student_roll: Some("R1".into()),
            ..Default::default()
        };
        let account = req.validate().unwrap();
        assert_eq!(account.email, "a@x.com");
        assert_eq!(account.profile.role(), Role::Student);
        match account.profile {
            NewProfile::Student { student_roll, .. } => {
                assert_eq!(student_roll.as_deref(), Some("R1"))
            }
            other => panic!("unexpected profile: {other:?}"),
        }
    }

    #[test]
    fn test_register_requires_core_fields() {
        let req = RegisterRequest {
            email: Some("a@x.com".into()),
            password: Some(String::new()),
            name: Some("Asha".into()),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let req = RegisterRequest {
            name: Some("Asha".into()),
            email: Some("a@x.com".into()),
            password: Some("pw".into()),
            role: Some("warden".into()),
            ..Default::default()
        };
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            email: Some("a@x.com".into()),
            password: None,
        };
        assert!(req.credentials().is_err());
    }
}
