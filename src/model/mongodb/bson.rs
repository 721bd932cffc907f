use mongodb::bson::{doc, Document};

/// Build an `_id` filter for one of our integer-keyed documents.
/// BSON has no unsigned integer types, so widen on the way in; MongoDB
/// matches numeric values across BSON number types.
pub fn u32_id_filter(id: u32) -> Document {
    doc! { "_id": i64::from(id) }
}
