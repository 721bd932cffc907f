use chrono::{SecondsFormat, Utc};
use mongodb::bson::doc;
use mongodb::Database;
use rocket::futures::TryStreamExt;
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
    Route, State,
};

use crate::error::{Error, Result};
use crate::model::{
    api::survey::{SurveySpec, TestSurveyCreated},
    common::QuestionType,
    db::{Question, Survey, SurveyCore, SurveyResponse, User},
    mongodb::{Coll, Counter, QUESTION_IDS, SURVEY_IDS},
};

pub fn routes() -> Vec<Route> {
    routes![health, test_diagnostics, create_test_survey]
}

/// Routes mounted at the server root rather than under `/api`.
pub fn root_routes() -> Vec<Route> {
    routes![welcome]
}

#[get("/")]
fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Waterlily Survey API",
        "version": env!("CARGO_PKG_VERSION"),
        "documentation": "/api/test",
    }))
}

#[get("/health")]
fn health() -> Json<Value> {
    Json(json!({ "message": "Server is running!" }))
}

/// Unauthenticated smoke-test endpoint reporting database connectivity and
/// row counts.
#[get("/test")]
async fn test_diagnostics(db: &State<Database>) -> (Status, Json<Value>) {
    match diagnostics(db).await {
        Ok(body) => (Status::Ok, Json(body)),
        Err(err) => (
            Status::InternalServerError,
            Json(json!({
                "message": "Error connecting to database",
                "error": err.to_string(),
            })),
        ),
    }
}

async fn diagnostics(db: &Database) -> Result<Value> {
    let users = Coll::<User>::from_db(db).count_documents(None, None).await?;
    let surveys_coll = Coll::<Survey>::from_db(db);
    let surveys = surveys_coll.count_documents(None, None).await?;
    let responses = Coll::<SurveyResponse>::from_db(db)
        .count_documents(None, None)
        .await?;

    // Questions are embedded in survey documents, so their count is a sum
    // of array sizes rather than a collection count.
    let pipeline = [doc! {
        "$group": {
            "_id": null,
            "total": { "$sum": { "$size": "$questions" } },
        },
    }];
    let questions = surveys_coll
        .aggregate(pipeline, None)
        .await?
        .try_next()
        .await?
        .and_then(|group| {
            let total = group.get("total")?;
            total.as_i64().or_else(|| total.as_i32().map(i64::from))
        })
        .unwrap_or(0);

    Ok(json!({
        "message": "Waterlily Survey API is working!",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "data": {
            "surveys": surveys,
            "questions": questions,
            "users": users,
            "responses": responses,
        },
        "endpoints": {
            "auth": {
                "register": "POST /api/auth/register",
                "login": "POST /api/auth/login",
                "currentUser": "GET /api/auth/me (protected)",
            },
            "surveys": {
                "getSurvey": "GET /api/surveys/:id (protected)",
                "submitResponse": "POST /api/surveys/:id/responses (protected)",
            },
            "responses": {
                "getUserResponses": "GET /api/responses/user (protected)",
                "getResponse": "GET /api/responses/:id (protected)",
            },
            "test": "GET /api/test",
        },
    }))
}

/// Create a small survey with two canned questions, for exercising the
/// submission workflow against a fresh database.
#[post("/test/survey", data = "<spec>", format = "json")]
async fn create_test_survey(
    spec: Json<SurveySpec>,
    surveys: Coll<Survey>,
    counters: Coll<Counter>,
) -> Result<(Status, Json<TestSurveyCreated>)> {
    let title = match spec.0.title.filter(|title| !title.is_empty()) {
        Some(title) => title,
        None => return Err(Error::bad_request("Title is required")),
    };
    let description = spec
        .0
        .description
        .unwrap_or_else(|| "A test survey created via API".to_string());

    let survey_id = Counter::next(&counters, SURVEY_IDS).await?;
    let first_question_id = Counter::next_many(&counters, QUESTION_IDS, 2).await?;

    let survey = Survey {
        id: survey_id,
        survey: SurveyCore {
            title,
            description: Some(description),
            created_at: Utc::now(),
            questions: vec![
                Question {
                    id: first_question_id,
                    title: "Test Question 1".to_string(),
                    description: None,
                    question_type: QuestionType::Text,
                    required: false,
                    order_index: 1,
                    options: None,
                },
                Question {
                    id: first_question_id + 1,
                    title: "Test Question 2".to_string(),
                    description: None,
                    question_type: QuestionType::Number,
                    required: true,
                    order_index: 2,
                    options: None,
                },
            ],
        },
    };

    surveys.insert_one(&survey, None).await?;

    Ok((
        Status::Created,
        Json(TestSurveyCreated {
            message: "Test survey created successfully".to_string(),
            survey: survey.into(),
        }),
    ))
}
