use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{AnswerId, QuestionId, ResponseId, SurveyId, UserId};

/// Core response data, as stored in the database.
/// A response is created exactly once per submission and never mutated; the
/// `user_id` is the sole access-control rule for reading it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCore {
    pub user_id: UserId,
    pub survey_id: SurveyId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
}

/// A response from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    #[serde(rename = "_id")]
    pub id: ResponseId,
    #[serde(flatten)]
    pub response: ResponseCore,
}

impl SurveyResponse {
    /// Create a response row for the given user and survey, stamped now.
    pub fn new(id: ResponseId, user_id: UserId, survey_id: SurveyId) -> Self {
        Self {
            id,
            response: ResponseCore {
                user_id,
                survey_id,
                submitted_at: Utc::now(),
            },
        }
    }
}

impl Deref for SurveyResponse {
    type Target = ResponseCore;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for SurveyResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}

/// Core answer data, as stored in the database.
/// For checkbox questions the value is the selected labels joined with
/// commas and no escaping, so labels containing commas are ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCore {
    pub response_id: ResponseId,
    pub question_id: QuestionId,
    pub value: String,
}

/// An answer from the database, with its unique ID.
/// Only ever created inside a response-submission transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: AnswerId,
    #[serde(flatten)]
    pub answer: AnswerCore,
}

impl Deref for Answer {
    type Target = AnswerCore;

    fn deref(&self) -> &Self::Target {
        &self.answer
    }
}

impl DerefMut for Answer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.answer
    }
}
