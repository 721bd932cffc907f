//! Types shared between the API and DB representations.

use serde::{Deserialize, Serialize};

/// A user's unique ID.
pub type UserId = u32;
/// A survey's unique ID.
pub type SurveyId = u32;
/// A question's unique ID. Globally unique, not just within its survey.
pub type QuestionId = u32;
/// A response's unique ID.
pub type ResponseId = u32;
/// An answer's unique ID.
pub type AnswerId = u32;

/// The input type of a question, which decides how the frontend renders it
/// and whether an `options` list is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Number,
    Select,
    Checkbox,
}
