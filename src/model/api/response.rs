use chrono::{DateTime, Utc};
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    common::{AnswerId, QuestionId, ResponseId, SurveyId, UserId},
    db::{Answer, Survey, SurveyResponse},
};

use super::survey::{QuestionDescription, SurveyDescription, SurveySummary};

/// The `POST /surveys/<id>/responses` request body.
///
/// `answers` is deliberately loosely typed: the API accepts any JSON there
/// and validates the shape itself, so a missing or non-array field gets the
/// API's own 400 message rather than a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub answers: Option<Value>,
}

/// A single validated `{questionId, value}` pair from a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSpec {
    pub question_id: QuestionId,
    pub value: String,
}

impl SubmitRequest {
    /// Validate the raw body into answer pairs.
    ///
    /// Values are coerced to their string representation; no checking
    /// against the question's declared type or options is performed, and no
    /// check that the question belongs to the target survey either.
    pub fn into_answers(self) -> Result<Vec<AnswerSpec>, Error> {
        let entries = match self.answers.as_ref().and_then(Value::as_array) {
            Some(entries) => entries,
            None => return Err(Error::bad_request("Answers array is required")),
        };

        entries
            .iter()
            .map(|entry| {
                let question_id = entry
                    .get("questionId")
                    .and_then(Value::as_u64)
                    .and_then(|id| QuestionId::try_from(id).ok())
                    .ok_or_else(|| {
                        Error::bad_request("Each answer requires an integer questionId")
                    })?;
                let value = match entry.get("value") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    _ => return Err(Error::bad_request("Each answer requires a scalar value")),
                };
                Ok(AnswerSpec { question_id, value })
            })
            .collect()
    }
}

/// An API-friendly answer, joined to its question.
///
/// `question` is absent only when the submitted question ID did not belong
/// to the response's survey, which the workflow deliberately does not
/// reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDescription {
    pub id: AnswerId,
    pub response_id: ResponseId,
    pub question_id: QuestionId,
    pub value: String,
    pub question: Option<QuestionDescription>,
}

impl AnswerDescription {
    fn new(answer: Answer, survey: &Survey) -> Self {
        let question = survey
            .question(answer.question_id)
            .cloned()
            .map(|question| QuestionDescription::new(survey.id, question));
        Self {
            id: answer.id,
            response_id: answer.answer.response_id,
            question_id: answer.answer.question_id,
            value: answer.answer.value,
            question,
        }
    }
}

/// A fully composed response: its answers (joined to questions) and its
/// survey with questions. Returned from submission and fetch-by-id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescription {
    pub id: ResponseId,
    pub user_id: UserId,
    pub survey_id: SurveyId,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<AnswerDescription>,
    pub survey: SurveyDescription,
}

impl ResponseDescription {
    pub fn new(response: SurveyResponse, answers: Vec<Answer>, survey: Survey) -> Self {
        let answers = answers
            .into_iter()
            .map(|answer| AnswerDescription::new(answer, &survey))
            .collect();
        Self {
            id: response.id,
            user_id: response.response.user_id,
            survey_id: response.response.survey_id,
            submitted_at: response.response.submitted_at,
            answers,
            survey: survey.into(),
        }
    }
}

/// A response as it appears in the caller's listing: same answers, but the
/// survey is summarised without its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub id: ResponseId,
    pub user_id: UserId,
    pub survey_id: SurveyId,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<AnswerDescription>,
    pub survey: SurveySummary,
}

impl ResponseSummary {
    pub fn new(response: SurveyResponse, answers: Vec<Answer>, survey: Survey) -> Self {
        let answers = answers
            .into_iter()
            .map(|answer| AnswerDescription::new(answer, &survey))
            .collect();
        Self {
            id: response.id,
            user_id: response.response.user_id,
            survey_id: response.response.survey_id,
            submitted_at: response.response.submitted_at,
            answers,
            survey: survey.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::serde::json::json;

    fn submission(answers: Value) -> SubmitRequest {
        SubmitRequest {
            answers: Some(answers),
        }
    }

    #[test]
    fn values_are_stringified() {
        let answers = submission(json!([
            {"questionId": 1, "value": 35},
            {"questionId": 2, "value": "Male"},
            {"questionId": 3, "value": true},
        ]))
        .into_answers()
        .unwrap();

        let values = answers.iter().map(|a| a.value.as_str()).collect::<Vec<_>>();
        assert_eq!(values, vec!["35", "Male", "true"]);
    }

    #[test]
    fn answers_must_be_an_array() {
        assert!(SubmitRequest { answers: None }.into_answers().is_err());
        assert!(submission(json!("not an array")).into_answers().is_err());
        assert!(submission(json!({"questionId": 1})).into_answers().is_err());
    }

    #[test]
    fn malformed_entries_are_rejected() {
        // questionId must be an integer...
        assert!(submission(json!([{"questionId": "one", "value": "x"}]))
            .into_answers()
            .is_err());
        // ...and the value a scalar.
        assert!(submission(json!([{"questionId": 1, "value": ["a", "b"]}]))
            .into_answers()
            .is_err());
        assert!(submission(json!([{"questionId": 1}])).into_answers().is_err());
    }

    #[test]
    fn empty_answers_are_allowed() {
        assert_eq!(submission(json!([])).into_answers().unwrap(), vec![]);
    }
}
