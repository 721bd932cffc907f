//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs live in the `_id` field.
//! - Datetimes are serialised in MongoDB's own format.

mod response;
pub use response::{Answer, AnswerCore, ResponseCore, SurveyResponse};

mod survey;
pub use survey::{Question, Survey, SurveyCore};

mod user;
pub use user::{User, UserCore};
