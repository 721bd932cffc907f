use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::UserId;

/// Core user data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    pub email: String,
    pub password_hash: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl UserCore {
    /// Create a new user, hashing their password with a random salt.
    pub fn new(email: String, password: &str) -> Result<Self, argon2::Error> {
        let salt: [u8; 16] = rand::random();
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())?;
        Ok(Self {
            email,
            password_hash,
            created_at: Utc::now(),
        })
    }

    /// Check whether the given password is correct.
    /// A malformed stored hash fails verification rather than erroring, so a
    /// login can never distinguish it from a wrong password.
    pub fn verify_password(&self, password: &str) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_bytes()).unwrap_or(false)
    }
}

/// A user from the database, with their unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(flatten)]
    pub user: UserCore,
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let user = UserCore::new("john.doe@example.com".to_string(), "password123").unwrap();
        assert!(user.verify_password("password123"));
        assert!(!user.verify_password("password124"));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        let user = UserCore {
            email: "jane.smith@example.com".to_string(),
            password_hash: "not-an-encoded-hash".to_string(),
            created_at: Utc::now(),
        };
        assert!(!user.verify_password("password123"));
    }

    #[test]
    fn salts_are_unique() {
        let first = UserCore::new("mike.wilson@example.com".to_string(), "password123").unwrap();
        let second = UserCore::new("mike.wilson@example.com".to_string(), "password123").unwrap();
        assert_ne!(first.password_hash, second.password_hash);
    }
}
