use chrono::NaiveDateTime;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::{delete, get, post};
use serde_derive::{Deserialize, Serialize};

use crate::db::schema::comments;
use crate::db::Db;
use crate::types::{ApiError, ApiResult, Validate, COMMENT_NOT_FOUND};
use crate::utils::{parse_id, serialize_date};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub article_id: i32,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentDetails {
    username: String,
    body: String,
}

impl Validate for CommentDetails {
    type Error = ApiError;
    fn validate(self) -> Result<Self, ApiError> {
        if self.username.trim().is_empty() || self.body.trim().is_empty() {
            Err(ApiError::BadRequest)
        } else {
            Ok(self)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    comments: Vec<Comment>,
}

#[get("/articles/<article_id>/comments")]
pub async fn list(db: Db, article_id: &str) -> ApiResult<CommentsResponse> {
    let article_id = parse_id(article_id, ApiError::ArticleNotFound)?;
    let comments = db.article_comments(article_id).await?.into_comments()?;
    Ok(Json(CommentsResponse { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub async fn add(
    db: Db,
    article_id: &str,
    details: Result<Json<CommentDetails>, json::Error<'_>>,
) -> Result<(Status, Json<CommentResponse>), ApiError> {
    let article_id = parse_id(article_id, ApiError::ArticleNotFound)?;
    let details = details
        .map_err(|_| ApiError::BadRequest)?
        .into_inner()
        .validate()?;
    let new_comment = NewComment {
        article_id,
        author: details.username,
        body: details.body,
    };
    let comment = db.insert_comment(new_comment).await?;
    Ok((Status::Created, Json(CommentResponse { comment })))
}

#[delete("/comments/<comment_id>")]
pub async fn remove(db: Db, comment_id: &str) -> Result<Status, ApiError> {
    let comment_id = parse_id(comment_id, ApiError::NotFound(COMMENT_NOT_FOUND))?;
    match db.delete_comment(comment_id).await? {
        0 => Err(ApiError::NotFound(COMMENT_NOT_FOUND)),
        _ => Ok(Status::NoContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(username: &str, body: &str) -> CommentDetails {
        CommentDetails {
            username: username.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn accepts_complete_details() {
        assert!(details("lurker", "First!").validate().is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        assert_eq!(details("lurker", "   ").validate().unwrap_err(), ApiError::BadRequest);
        assert_eq!(details("", "hello").validate().unwrap_err(), ApiError::BadRequest);
    }
}
