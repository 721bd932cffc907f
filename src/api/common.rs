use mongodb::bson::doc;
use mongodb::options::FindOptions;
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    api::response::{ResponseDescription, ResponseSummary},
    auth::AuthToken,
    db::{Answer, Survey, SurveyResponse, User},
    mongodb::{u32_id_filter, Coll},
};

/// Parse an integer ID path segment, rejecting malformed values with a 400
/// rather than letting the route fall through to a 404.
pub fn parse_id(raw: &str, what: &str) -> Result<u32> {
    raw.parse()
        .map_err(|_| Error::bad_request(format!("Invalid {what} ID")))
}

/// Return a User from the database via looking up their token ID.
pub async fn user_by_token(token: &AuthToken, users: &Coll<User>) -> Result<User> {
    users
        .find_one(u32_id_filter(token.user_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("No user found with ID {}", token.user_id)))
}

/// Return a Survey (with its embedded questions) by ID.
pub async fn survey_by_id(survey_id: u32, surveys: &Coll<Survey>) -> Result<Survey> {
    surveys
        .find_one(u32_id_filter(survey_id), None)
        .await?
        .ok_or_else(|| Error::not_found("Survey not found"))
}

/// Load the survey and answer rows belonging to a stored response.
async fn response_parts(
    response: &SurveyResponse,
    surveys: &Coll<Survey>,
    answers: &Coll<Answer>,
) -> Result<(Survey, Vec<Answer>)> {
    let survey = surveys
        .find_one(u32_id_filter(response.survey_id), None)
        .await?
        .ok_or_else(|| Error::not_found("Survey not found"))?;

    let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
    let rows = answers
        .find(doc! { "response_id": i64::from(response.id) }, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    Ok((survey, rows))
}

/// Compose a stored response with its answers (joined to questions) and its
/// full survey, as returned from submission and fetch-by-id.
pub async fn describe_response(
    response: SurveyResponse,
    surveys: &Coll<Survey>,
    answers: &Coll<Answer>,
) -> Result<ResponseDescription> {
    let (survey, rows) = response_parts(&response, surveys, answers).await?;
    Ok(ResponseDescription::new(response, rows, survey))
}

/// Compose a stored response for the caller's listing, with its survey
/// summarised.
pub async fn summarize_response(
    response: SurveyResponse,
    surveys: &Coll<Survey>,
    answers: &Coll<Answer>,
) -> Result<ResponseSummary> {
    let (survey, rows) = response_parts(&response, surveys, answers).await?;
    Ok(ResponseSummary::new(response, rows, survey))
}

/// Test helpers shared across the API test modules.
#[cfg(test)]
pub(crate) mod testing {
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;
    use rocket::serde::json::json;

    use crate::model::api::auth::{AuthResponse, Credentials};

    /// Register a user via the API, returning the issued token and user info.
    pub(crate) async fn register(client: &Client, credentials: &Credentials) -> AuthResponse {
        let response = client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(
                json!({
                    "email": &credentials.email,
                    "password": &credentials.password,
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        response.into_json().await.unwrap()
    }

    /// An `Authorization: Bearer` header for the given token.
    pub(crate) fn bearer(token: &str) -> Header<'static> {
        Header::new("Authorization", format!("Bearer {token}"))
    }
}
