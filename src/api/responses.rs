use mongodb::bson::doc;
use mongodb::options::FindOptions;
use rocket::futures::TryStreamExt;
use rocket::{http::Status, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::response::{ResponseDescription, ResponseSummary},
    auth::AuthToken,
    db::{Answer, Survey, SurveyResponse},
    mongodb::{u32_id_filter, Coll},
};

use super::common::{describe_response, parse_id, summarize_response};

pub fn routes() -> Vec<Route> {
    routes![get_user_responses, get_response]
}

// The static `user` segment outranks the `<response_id>` route, so this
// never collides with a fetch-by-id.
#[get("/responses/user")]
async fn get_user_responses(
    token: AuthToken,
    responses: Coll<SurveyResponse>,
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
) -> Result<Json<Vec<ResponseSummary>>> {
    let options = FindOptions::builder()
        .sort(doc! { "submitted_at": -1 })
        .build();
    let rows = responses
        .find(doc! { "user_id": i64::from(token.user_id) }, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for response in rows {
        summaries.push(summarize_response(response, &surveys, &answers).await?);
    }
    Ok(Json(summaries))
}

#[get("/responses/<response_id>")]
async fn get_response(
    token: AuthToken,
    response_id: &str,
    responses: Coll<SurveyResponse>,
    surveys: Coll<Survey>,
    answers: Coll<Answer>,
) -> Result<Json<ResponseDescription>> {
    let response_id = parse_id(response_id, "response")?;

    let response = responses
        .find_one(u32_id_filter(response_id), None)
        .await?
        .ok_or_else(|| Error::not_found("Response not found"))?;

    // Responses are private to their submitter.
    if response.user_id != token.user_id {
        return Err(Error::Status(
            Status::Forbidden,
            "Access denied".to_string(),
        ));
    }

    let description = describe_response(response, &surveys, &answers).await?;
    Ok(Json(description))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{json, Value},
    };

    use crate::api::common::testing::{bearer, register};
    use crate::model::api::auth::Credentials;
    use crate::model::api::response::{ResponseDescription, ResponseSummary};
    use crate::model::db::Survey;
    use crate::model::mongodb::Coll;

    async fn submit(client: &Client, token: &str, survey_id: u32, answers: Value) -> u32 {
        let response = client
            .post(format!("/api/surveys/{survey_id}/responses"))
            .header(ContentType::JSON)
            .header(bearer(token))
            .body(json!({ "answers": answers }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        response
            .into_json::<ResponseDescription>()
            .await
            .unwrap()
            .id
    }

    #[backend_test]
    async fn list_own_responses_newest_first(client: Client, surveys: Coll<Survey>) {
        surveys
            .insert_many(
                [Survey::demographics_example(), Survey::feedback_example()],
                None,
            )
            .await
            .unwrap();
        let issued = register(&client, &Credentials::example1()).await;

        let first = submit(
            &client,
            &issued.token,
            101,
            json!([
                { "questionId": 1, "value": "35" },
                { "questionId": 2, "value": "Male" },
            ]),
        )
        .await;
        let second = submit(
            &client,
            &issued.token,
            102,
            json!([{ "questionId": 5, "value": "High" }]),
        )
        .await;

        let response = client
            .get("/api/responses/user")
            .header(bearer(&issued.token))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let listed = response.into_json::<Vec<ResponseSummary>>().await.unwrap();
        // Newest submission first.
        assert_eq!(
            vec![second, first],
            listed.iter().map(|r| r.id).collect::<Vec<_>>()
        );
        // The listing embeds the survey summary, not its questions.
        assert_eq!("Mental Health Assessment", listed[0].survey.title);
        assert_eq!(1, listed[0].answers.len());
    }

    #[backend_test]
    async fn listing_excludes_other_users(client: Client, surveys: Coll<Survey>) {
        surveys
            .insert_many([Survey::feedback_example()], None)
            .await
            .unwrap();
        let first = register(&client, &Credentials::example1()).await;
        let second = register(&client, &Credentials::example2()).await;

        submit(
            &client,
            &first.token,
            102,
            json!([{ "questionId": 5, "value": "Low" }]),
        )
        .await;

        let response = client
            .get("/api/responses/user")
            .header(bearer(&second.token))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let listed = response.into_json::<Vec<ResponseSummary>>().await.unwrap();
        assert!(listed.is_empty());
    }

    #[backend_test]
    async fn get_response_rejects_non_owner(client: Client, surveys: Coll<Survey>) {
        surveys
            .insert_many([Survey::feedback_example()], None)
            .await
            .unwrap();
        let owner = register(&client, &Credentials::example1()).await;
        let other = register(&client, &Credentials::example2()).await;

        let id = submit(
            &client,
            &owner.token,
            102,
            json!([{ "questionId": 5, "value": "Low" }]),
        )
        .await;

        let response = client
            .get(format!("/api/responses/{id}"))
            .header(bearer(&other.token))
            .dispatch()
            .await;

        assert_eq!(Status::Forbidden, response.status());
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!("Access denied", body["message"]);
    }

    #[backend_test]
    async fn get_response_not_found(client: Client) {
        let issued = register(&client, &Credentials::example1()).await;

        let response = client
            .get("/api/responses/999")
            .header(bearer(&issued.token))
            .dispatch()
            .await;

        assert_eq!(Status::NotFound, response.status());
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!("Response not found", body["message"]);
    }

    #[backend_test]
    async fn get_response_invalid_id(client: Client) {
        let issued = register(&client, &Credentials::example1()).await;

        let response = client
            .get("/api/responses/latest")
            .header(bearer(&issued.token))
            .dispatch()
            .await;

        assert_eq!(Status::BadRequest, response.status());
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!("Invalid response ID", body["message"]);
    }

    #[backend_test]
    async fn responses_require_token(client: Client) {
        let response = client.get("/api/responses/user").dispatch().await;

        assert_eq!(Status::Unauthorized, response.status());
    }
}
