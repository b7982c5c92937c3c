use diesel::r2d2::PoolError;
use diesel::result::Error as DieselError;
use log::error;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde_json::json;

use crate::utils::try_respond;

pub const BAD_REQUEST: &str = "Bad Request.";
pub const ARTICLE_NOT_FOUND: &str = "Article does not exist.";
pub const COMMENT_NOT_FOUND: &str = "Couldn't find a comment with that ID.";
pub const USERNAME_NOT_FOUND: &str = "Username doesn't exist.";

/// Checks a decoded payload before it reaches the repository.
pub trait Validate
where
    Self: Sized,
{
    type Error;
    fn validate(self) -> Result<Self, Self::Error>;
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest,
    /// Answered with a plain text body, unlike every other 404.
    ArticleNotFound,
    NotFound(&'static str),
    Diesel(DieselError),
    Pool(PoolError),
    Internal,
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> ApiError {
        ApiError::Pool(err)
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &ApiError) -> bool {
        match (self, other) {
            (ApiError::BadRequest, ApiError::BadRequest) => true,
            (ApiError::ArticleNotFound, ApiError::ArticleNotFound) => true,
            (ApiError::NotFound(a), ApiError::NotFound(b)) => a == b,
            (ApiError::Internal, ApiError::Internal) => true,
            _ => false,
        }
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        match self {
            ApiError::BadRequest => {
                try_respond(req, json!({ "message": BAD_REQUEST }), Status::BadRequest)
            }
            ApiError::ArticleNotFound => (Status::NotFound, ARTICLE_NOT_FOUND).respond_to(req),
            ApiError::NotFound(message) => {
                try_respond(req, json!({ "message": message }), Status::NotFound)
            }
            ApiError::Diesel(error) => {
                error!("{} {}: query failed: {}", req.method(), req.uri(), error);
                Err(Status::InternalServerError)
            }
            ApiError::Pool(error) => {
                error!("{} {}: no database connection: {}", req.method(), req.uri(), error);
                Err(Status::InternalServerError)
            }
            ApiError::Internal => {
                error!("{} {}: internal failure", req.method(), req.uri());
                Err(Status::InternalServerError)
            }
        }
    }
}
