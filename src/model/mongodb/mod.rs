mod bson;
mod collection;
mod counter;
mod errors;

pub use bson::u32_id_filter;
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use counter::{
    ensure_counters_exist, Counter, ANSWER_IDS, QUESTION_IDS, RESPONSE_IDS, SURVEY_IDS, USER_IDS,
};
pub use errors::is_duplicate_key_error;
