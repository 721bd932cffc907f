use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{QuestionId, QuestionType, SurveyId},
    db::{Question, Survey},
};

/// An API-friendly question description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDescription {
    pub id: QuestionId,
    pub survey_id: SurveyId,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    pub order_index: i32,
    /// JSON-encoded list of choice labels; only present for select/checkbox.
    pub options: Option<String>,
}

impl QuestionDescription {
    pub fn new(survey_id: SurveyId, question: Question) -> Self {
        Self {
            id: question.id,
            survey_id,
            title: question.title,
            description: question.description,
            question_type: question.question_type,
            required: question.required,
            order_index: question.order_index,
            options: question.options,
        }
    }
}

/// A full survey description, questions sorted by display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDescription {
    pub id: SurveyId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<QuestionDescription>,
}

impl From<Survey> for SurveyDescription {
    fn from(survey: Survey) -> Self {
        let id = survey.id;
        let mut questions = survey.survey.questions;
        questions.sort_by_key(|q| q.order_index);
        Self {
            id,
            title: survey.survey.title,
            description: survey.survey.description,
            created_at: survey.survey.created_at,
            questions: questions
                .into_iter()
                .map(|question| QuestionDescription::new(id, question))
                .collect(),
        }
    }
}

/// A summary of a survey, shorter than the full `SurveyDescription`.
/// Used when a survey is embedded in a response listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub id: SurveyId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Survey> for SurveySummary {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id,
            title: survey.survey.title,
            description: survey.survey.description,
            created_at: survey.survey.created_at,
        }
    }
}

/// The `POST /test/survey` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveySpec {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// The `POST /test/survey` response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSurveyCreated {
    pub message: String,
    pub survey: SurveyDescription,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_sorts_questions() {
        let description = SurveyDescription::from(Survey::feedback_example());
        assert_eq!(
            description
                .questions
                .iter()
                .map(|q| q.id)
                .collect::<Vec<_>>(),
            vec![5, 4]
        );
        assert!(description.questions.iter().all(|q| q.survey_id == 102));
    }
}
