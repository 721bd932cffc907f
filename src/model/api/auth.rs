use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{common::UserId, db::User};

/// The registration/login request body.
///
/// Both fields are optional at the serde level so that an incomplete body
/// still reaches the handler and gets the API's own 400 message instead of
/// a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Extract both fields, rejecting absent or empty values.
    pub fn require(self) -> Result<(String, String), Error> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(Error::bad_request("Email and password are required")),
        }
    }
}

/// The minimal user info returned alongside a freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.user.email,
        }
    }
}

/// A successful register/login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Full user details, minus anything secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDetails {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.user.email,
            created_at: user.user.created_at,
        }
    }
}

/// The `GET /auth/me` response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: UserDetails,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Credentials {
        pub fn example1() -> Self {
            Self {
                email: Some("john.doe@example.com".to_string()),
                password: Some("password123".to_string()),
            }
        }

        pub fn example2() -> Self {
            Self {
                email: Some("jane.smith@example.com".to_string()),
                password: Some("hunter2hunter2".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_missing_or_empty_fields() {
        assert!(Credentials::example1().require().is_ok());

        let missing = Credentials {
            email: Some("john.doe@example.com".to_string()),
            password: None,
        };
        assert!(missing.require().is_err());

        let empty = Credentials {
            email: Some(String::new()),
            password: Some("password123".to_string()),
        };
        assert!(empty.require().is_err());
    }
}
