use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::{
    common::UserId,
    db::User,
    mongodb::{u32_id_filter, Coll},
};

/// An authentication token proving the bearer's user identity.
///
/// As a request guard this verifies the `Authorization: Bearer` header:
/// signature, expiry, and that the embedded user still exists. Handlers
/// downstream get the resolved identity from here rather than re-parsing
/// anything themselves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    pub user_id: UserId,
}

impl AuthToken {
    /// Create a token for the given user.
    pub fn for_user(user: &User) -> Self {
        Self { user_id: user.id }
    }

    /// Encode into a signed JWT, valid for `auth_ttl` from now.
    pub fn into_jwt(self, config: &Config) -> Result<String, Error> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        let jwt = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;
        Ok(jwt)
    }

    /// Decode and validate a JWT, checking signature and expiry.
    pub fn from_jwt(jwt: &str, config: &Config) -> Result<Self, Error> {
        let data: TokenData<Claims> = jsonwebtoken::decode(
            jwt,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )?;
        Ok(data.claims.token)
    }
}

/// JWT claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        // Missing credentials and bad credentials report differently.
        let bearer = match req
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix("Bearer "))
        {
            Some(bearer) => bearer,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::Status(Status::Unauthorized, "Access token required".to_string()),
                ));
            }
        };

        // Decode the token.
        let token = match Self::from_jwt(bearer, config) {
            Ok(token) => token,
            Err(err) => return Outcome::Failure((Status::Forbidden, err)),
        };

        // Check the user actually exists.
        let db = req.guard::<&State<mongodb::Database>>().await.unwrap();
        let user = Coll::<User>::from_db(db)
            .find_one(u32_id_filter(token.user_id), None)
            .await;
        match user {
            Ok(Some(_)) => Outcome::Success(token),
            Ok(None) => Outcome::Failure((
                Status::Forbidden,
                Error::Status(Status::Forbidden, "Invalid token".to_string()),
            )),
            Err(e) => Outcome::Failure((Status::InternalServerError, e.into())),
        }
    }
}
