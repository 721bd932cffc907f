use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
    Database,
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::Coll;

/// Counter names for every entity that gets an auto-increment ID.
pub const USER_IDS: &str = "user_ids";
pub const SURVEY_IDS: &str = "survey_ids";
pub const QUESTION_IDS: &str = "question_ids";
pub const RESPONSE_IDS: &str = "response_ids";
pub const ANSWER_IDS: &str = "answer_ids";

const ALL_COUNTERS: [&str; 5] = [USER_IDS, SURVEY_IDS, QUESTION_IDS, RESPONSE_IDS, ANSWER_IDS];

/// A counter object used to implement auto-increment IDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically retrieve the next value of the named counter.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        Self::next_many(counters, id, 1).await
    }

    /// Atomically reserve a contiguous block of `count` IDs from the named
    /// counter, returning the first. Reserving zero IDs is a no-op that
    /// still returns the current value.
    pub async fn next_many(counters: &Coll<Counter>, id: &str, count: u32) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": i64::from(count) }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to find counter '{id}'"),
                )
            })?;
        Ok(counter.next)
    }
}

/// Ensure every ID counter exists, starting at 1.
///
/// This operation is idempotent; existing counters are left untouched.
pub async fn ensure_counters_exist(db: &Database) -> std::result::Result<(), DbError> {
    debug!("Ensuring id counters exist");

    let counters = Coll::<Counter>::from_db(db);
    for id in ALL_COUNTERS {
        let update = doc! {
            "$setOnInsert": { "next": 1_i64 }
        };
        let options = UpdateOptions::builder().upsert(true).build();
        counters.update_one(doc! { "_id": id }, update, options).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::Database;

    #[backend_test]
    async fn counter_increment(db: Database) {
        let counters = Coll::<Counter>::from_db(&db);

        // Counters were created by setup and start at 1.
        let next = Counter::next(&counters, SURVEY_IDS).await.unwrap();
        assert_eq!(next, 1);

        // Check the counter was incremented.
        let next = Counter::next(&counters, SURVEY_IDS).await.unwrap();
        assert_eq!(next, 2);
    }

    #[backend_test]
    async fn counter_block_reservation(db: Database) {
        let counters = Coll::<Counter>::from_db(&db);

        // Reserve a block of three IDs in one round trip.
        let first = Counter::next_many(&counters, ANSWER_IDS, 3).await.unwrap();
        assert_eq!(first, 1);

        // The next caller sees the counter past the whole block.
        let next = Counter::next(&counters, ANSWER_IDS).await.unwrap();
        assert_eq!(next, 4);
    }

    #[backend_test]
    async fn ensure_is_idempotent(db: Database) {
        let counters = Coll::<Counter>::from_db(&db);

        // Bump a counter, re-run the setup, and check it was not reset.
        Counter::next(&counters, USER_IDS).await.unwrap();
        ensure_counters_exist(&db).await.unwrap();

        let next = Counter::next(&counters, USER_IDS).await.unwrap();
        assert_eq!(next, 2);
    }
}
