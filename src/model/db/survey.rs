use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{QuestionId, QuestionType, SurveyId};

/// Core survey data, as stored in the database.
/// Questions are embedded; a survey is immutable once created, so there is
/// no partial-update path to worry about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyCore {
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl SurveyCore {
    /// Questions sorted ascending by order index. This is the display and
    /// validation order; insertion order means nothing.
    pub fn questions_in_order(&self) -> Vec<&Question> {
        let mut questions = self.questions.iter().collect::<Vec<_>>();
        questions.sort_by_key(|q| q.order_index);
        questions
    }

    /// The IDs of all required questions, in question order.
    pub fn required_question_ids(&self) -> Vec<QuestionId> {
        self.questions_in_order()
            .into_iter()
            .filter(|q| q.required)
            .map(|q| q.id)
            .collect()
    }

    /// The required question IDs not covered by the given answered set,
    /// in question order.
    pub fn missing_required_ids(&self, answered: &HashSet<QuestionId>) -> Vec<QuestionId> {
        self.required_question_ids()
            .into_iter()
            .filter(|id| !answered.contains(id))
            .collect()
    }

    /// Look up an embedded question by its ID.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A single question within a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique ID.
    pub id: QuestionId,
    /// Question text.
    pub title: String,
    /// Optional help text.
    pub description: Option<String>,
    /// Input type.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Whether a submission must answer this question.
    pub required: bool,
    /// Display position; need not be contiguous across the survey.
    pub order_index: i32,
    /// JSON-encoded list of choice labels; only present for select/checkbox.
    pub options: Option<String>,
}

/// A survey from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: SurveyId,
    #[serde(flatten)]
    pub survey: SurveyCore,
}

impl Deref for Survey {
    type Target = SurveyCore;

    fn deref(&self) -> &Self::Target {
        &self.survey
    }
}

impl DerefMut for Survey {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.survey
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    use chrono::Duration;

    impl Survey {
        /// A survey with a required number question (id 1), a required
        /// select question (id 2) and an optional checkbox question (id 7).
        /// Created a day ago, so it sorts after newer examples.
        pub fn demographics_example() -> Self {
            Self {
                id: 101,
                survey: SurveyCore {
                    title: "Demographic & Health Information Survey".to_string(),
                    description: Some(
                        "This survey collects demographic and health information."
                            .to_string(),
                    ),
                    created_at: Utc::now() - Duration::days(1),
                    questions: vec![
                        Question {
                            id: 1,
                            title: "What is your age?".to_string(),
                            description: None,
                            question_type: QuestionType::Number,
                            required: true,
                            order_index: 1,
                            options: None,
                        },
                        Question {
                            id: 2,
                            title: "What is your gender?".to_string(),
                            description: None,
                            question_type: QuestionType::Select,
                            required: true,
                            order_index: 2,
                            options: Some(
                                "[\"Male\",\"Female\",\"Non-binary\",\"Prefer not to say\"]"
                                    .to_string(),
                            ),
                        },
                        Question {
                            id: 7,
                            title: "What type of health insurance do you have?".to_string(),
                            description: Some("Select all that apply.".to_string()),
                            question_type: QuestionType::Checkbox,
                            required: false,
                            order_index: 3,
                            options: Some(
                                "[\"Employer-provided\",\"Private insurance\",\"Medicare\",\"Medicaid\"]"
                                    .to_string(),
                            ),
                        },
                    ],
                },
            }
        }

        /// A survey whose questions are stored out of display order: the
        /// question with order index 1 comes second in the vector.
        pub fn feedback_example() -> Self {
            Self {
                id: 102,
                survey: SurveyCore {
                    title: "Mental Health Assessment".to_string(),
                    description: None,
                    created_at: Utc::now(),
                    questions: vec![
                        Question {
                            id: 4,
                            title: "Anything else you would like to share?".to_string(),
                            description: None,
                            question_type: QuestionType::Textarea,
                            required: false,
                            order_index: 2,
                            options: None,
                        },
                        Question {
                            id: 5,
                            title: "How would you rate your stress level?".to_string(),
                            description: None,
                            question_type: QuestionType::Text,
                            required: true,
                            order_index: 1,
                            options: None,
                        },
                    ],
                },
            }
        }
    }
}
