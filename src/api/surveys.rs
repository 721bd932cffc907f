use std::collections::HashSet;

use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::Client;
use rocket::futures::TryStreamExt;
use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{response::ResponseDescription, response::SubmitRequest, survey::SurveyDescription},
    auth::AuthToken,
    db::{Answer, AnswerCore, Survey, SurveyResponse},
    mongodb::{u32_id_filter, Coll, Counter, ANSWER_IDS, RESPONSE_IDS},
};

use super::common::{describe_response, parse_id, survey_by_id};

pub fn routes() -> Vec<Route> {
    routes![get_surveys, get_survey, submit_response]
}

#[get("/surveys")]
async fn get_surveys(
    _token: AuthToken,
    surveys: Coll<Survey>,
) -> Result<Json<Vec<SurveyDescription>>> {
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();
    let surveys = surveys
        .find(None, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    Ok(Json(surveys.into_iter().map(Into::into).collect()))
}

#[get("/surveys/<survey_id>")]
async fn get_survey(
    _token: AuthToken,
    survey_id: &str,
    surveys: Coll<Survey>,
) -> Result<Json<SurveyDescription>> {
    let survey_id = parse_id(survey_id, "survey")?;
    let survey = survey_by_id(survey_id, &surveys).await?;
    Ok(Json(survey.into()))
}

/// Submit a response: validate required-question coverage, then persist the
/// response row and all answer rows as one atomic unit.
#[post("/surveys/<survey_id>/responses", data = "<submission>", format = "json")]
async fn submit_response(
    token: AuthToken,
    survey_id: &str,
    submission: Json<SubmitRequest>,
    surveys: Coll<Survey>,
    responses: Coll<SurveyResponse>,
    answers: Coll<Answer>,
    counters: Coll<Counter>,
    db_client: &State<Client>,
) -> Result<(Status, Json<ResponseDescription>)> {
    let survey_id = parse_id(survey_id, "survey")?;
    let answer_specs = submission.0.into_answers()?;

    let survey = survey_by_id(survey_id, &surveys).await?;

    // Every required question must be answered; nothing is persisted
    // otherwise.
    let answered = answer_specs
        .iter()
        .map(|spec| spec.question_id)
        .collect::<HashSet<_>>();
    let missing = survey.missing_required_ids(&answered);
    if !missing.is_empty() {
        return Err(Error::MissingAnswers(missing));
    }

    // Reserve IDs up front: one for the response, a contiguous block for
    // the answers. Counter gaps from an aborted transaction are harmless.
    let response_id = Counter::next(&counters, RESPONSE_IDS).await?;
    let answer_count = u32::try_from(answer_specs.len()).map_err(|_| {
        Error::bad_request("Too many answers")
    })?;
    let first_answer_id = Counter::next_many(&counters, ANSWER_IDS, answer_count).await?;

    let response = SurveyResponse::new(response_id, token.user_id, survey_id);
    let new_answers = answer_specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| Answer {
            id: first_answer_id + i as u32,
            answer: AnswerCore {
                response_id,
                question_id: spec.question_id,
                value: spec.value,
            },
        })
        .collect::<Vec<_>>();

    // All-or-nothing: the response and its answers commit together.
    // Bailing out early drops the session, which aborts the transaction.
    {
        let mut session = db_client.start_session(None).await?;
        session.start_transaction(None).await?;

        responses
            .insert_one_with_session(&response, None, &mut session)
            .await?;
        if !new_answers.is_empty() {
            answers
                .insert_many_with_session(&new_answers, None, &mut session)
                .await?;
        }

        session.commit_transaction().await?;
    }

    // Re-read the committed state for the reply.
    let response = responses
        .find_one(u32_id_filter(response_id), None)
        .await?
        .ok_or_else(|| {
            Error::Status(
                Status::InternalServerError,
                format!("Failed to re-read committed response {response_id}"),
            )
        })?;
    let description = describe_response(response, &surveys, &answers).await?;

    Ok((Status::Created, Json(description)))
}
