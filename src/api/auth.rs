use mongodb::bson::doc;
use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::auth::{AuthResponse, CurrentUser, Credentials},
    auth::AuthToken,
    db::{User, UserCore},
    mongodb::{is_duplicate_key_error, Coll, Counter, USER_IDS},
};
use crate::Config;

use super::common::user_by_token;

pub fn routes() -> Vec<Route> {
    routes![register, login, get_current_user]
}

#[post("/auth/register", data = "<credentials>", format = "json")]
async fn register(
    credentials: Json<Credentials>,
    users: Coll<User>,
    counters: Coll<Counter>,
    config: &State<Config>,
) -> Result<(Status, Json<AuthResponse>)> {
    let (email, password) = credentials.0.require()?;

    // Cheap pre-check; the unique index is the real guarantee.
    let with_email = doc! { "email": &email };
    if users.find_one(with_email, None).await?.is_some() {
        return Err(Error::bad_request("User already exists"));
    }

    let id = Counter::next(&counters, USER_IDS).await?;
    let user = User {
        id,
        user: UserCore::new(email, &password)?,
    };

    if let Err(err) = users.insert_one(&user, None).await {
        // Lost a race against a concurrent registration for the same email.
        if is_duplicate_key_error(&err) {
            return Err(Error::bad_request("User already exists"));
        }
        return Err(err.into());
    }

    let token = AuthToken::for_user(&user).into_jwt(config)?;
    Ok((
        Status::Created,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[post("/auth/login", data = "<credentials>", format = "json")]
async fn login(
    credentials: Json<Credentials>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<Json<AuthResponse>> {
    let (email, password) = credentials.0.require()?;

    // Unknown email and wrong password fail identically, to avoid telling
    // the caller which emails are registered.
    let with_email = doc! { "email": &email };
    let user = users
        .find_one(with_email, None)
        .await?
        .filter(|user| user.verify_password(&password))
        .ok_or_else(|| Error::bad_request("Invalid credentials"))?;

    let token = AuthToken::for_user(&user).into_jwt(config)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[get("/auth/me")]
async fn get_current_user(token: AuthToken, users: Coll<User>) -> Result<Json<CurrentUser>> {
    let user = user_by_token(&token, &users).await?;
    Ok(Json(CurrentUser { user: user.into() }))
}
