use std::io::Cursor;

use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use mongodb::error::Error as DbError;
use rocket::{
    http::{ContentType, Status, StatusClass},
    response::Responder,
    serde::json::{json, Value},
    Response,
};
use thiserror::Error;

use crate::logging::RequestId;
use crate::model::common::QuestionId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("{1}")]
    Status(Status, String),
    #[error("Missing answers for required questions: {0:?}")]
    MissingAnswers(Vec<QuestionId>),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, message.into())
    }

    /// The HTTP status and JSON body this error translates to at the
    /// request boundary. Internal failures get a generic message; the
    /// detail is only ever logged server-side.
    fn status_and_body(&self) -> (Status, Value) {
        match self {
            Self::Status(status, message) => (*status, json!({ "message": message })),
            Self::MissingAnswers(missing) => (
                Status::BadRequest,
                json!({
                    "message": "Missing answers for required questions",
                    "missingQuestions": missing,
                }),
            ),
            Self::Jwt(_) => (Status::Forbidden, json!({ "message": "Invalid token" })),
            Self::Db(_) | Self::Argon2(_) => (
                Status::InternalServerError,
                json!({ "message": "Internal server error" }),
            ),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let id = req.local_cache(RequestId::next);
        let (status, body) = self.status_and_body();
        match status.class() {
            StatusClass::ServerError => error!("rsp{id} {self:?}"),
            _ => warn!("rsp{id} {status}: {self}"),
        }

        let body = body.to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let (status, body) = Error::bad_request("Invalid survey ID").status_and_body();
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["message"], "Invalid survey ID");

        let (status, body) = Error::not_found("Survey not found").status_and_body();
        assert_eq!(status, Status::NotFound);
        assert_eq!(body["message"], "Survey not found");
    }

    #[test]
    fn missing_answers_carry_question_ids() {
        let (status, body) = Error::MissingAnswers(vec![2, 5]).status_and_body();
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["message"], "Missing answers for required questions");
        assert_eq!(body["missingQuestions"], json!([2, 5]));
    }
}
