use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use diesel::result::Error as DieselError;
use error_chain::error_chain;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use rocket::Request;
use std::ops::Deref;
use std::sync::Arc;

use crate::article::{Article, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::types::ApiError;

pub mod fixture;
pub mod memory;
pub mod pg;
pub mod schema;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type DbResult<T> = ::std::result::Result<T, ApiError>;

pub type SharedRepository = Arc<dyn Repository>;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::PoolError);
        Diesel(DieselError);
    }

    errors {
        Config(reason: String) {
            description("invalid configuration")
            display("invalid configuration: {}", reason)
        }
        Migration(reason: String) {
            description("migration failed")
            display("migration failed: {}", reason)
        }
        Launch(reason: String) {
            description("server failed to launch")
            display("server failed to launch: {}", reason)
        }
    }
}

pub fn init_pool(database_url: &str, max_size: u32) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Comments for an article together with whether the article itself exists.
///
/// An empty list alone cannot tell an article without comments apart from a
/// missing article, so both facts travel together.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleComments {
    pub article_exists: bool,
    pub comments: Vec<Comment>,
}

impl ArticleComments {
    pub fn into_comments(self) -> DbResult<Vec<Comment>> {
        if self.article_exists || !self.comments.is_empty() {
            Ok(self.comments)
        } else {
            Err(ApiError::ArticleNotFound)
        }
    }
}

/// The data-access functions behind every route.
#[async_trait]
pub trait Repository: Send + Sync {
    /// All topics, in storage order.
    async fn topics(&self) -> DbResult<Vec<Topic>>;

    /// All articles without bodies, newest first, each with its comment count.
    async fn articles(&self) -> DbResult<Vec<ArticleSummary>>;

    /// One article with its body; `ApiError::ArticleNotFound` when absent.
    async fn article(&self, article_id: i32) -> DbResult<Article>;

    /// An article's comments, newest first, and whether the article exists.
    async fn article_comments(&self, article_id: i32) -> DbResult<ArticleComments>;

    /// Stores a comment and returns the stored row.
    async fn insert_comment(&self, comment: NewComment) -> DbResult<Comment>;

    /// Deletes a comment, returning the number of rows removed.
    async fn delete_comment(&self, comment_id: i32) -> DbResult<usize>;
}

pub struct Db(pub SharedRepository);

/// Hands the managed repository to a handler. If none is managed, fails with
/// an `InternalServerError` status.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Db, ()> {
        match request.rocket().state::<SharedRepository>() {
            Some(repository) => Outcome::Success(Db(repository.clone())),
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

impl Deref for Db {
    type Target = dyn Repository;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn comment(comment_id: i32) -> Comment {
        Comment {
            comment_id,
            body: "Lobster pot".to_string(),
            article_id: 1,
            author: "icellusedkars".to_string(),
            votes: 0,
            created_at: DateTime::from_timestamp_millis(1589577540000)
                .unwrap()
                .naive_utc(),
        }
    }

    #[test]
    fn comments_of_existing_article_are_returned() {
        let found = ArticleComments {
            article_exists: true,
            comments: vec![comment(1)],
        };
        assert_eq!(found.into_comments().unwrap().len(), 1);
    }

    #[test]
    fn existing_article_without_comments_is_empty() {
        let empty = ArticleComments {
            article_exists: true,
            comments: vec![],
        };
        assert_eq!(empty.into_comments(), Ok(vec![]));
    }

    #[test]
    fn missing_article_is_not_found() {
        let missing = ArticleComments {
            article_exists: false,
            comments: vec![],
        };
        assert_eq!(missing.into_comments(), Err(ApiError::ArticleNotFound));
    }

    #[test]
    fn comments_win_over_a_stale_existence_check() {
        let racing = ArticleComments {
            article_exists: false,
            comments: vec![comment(2)],
        };
        assert!(racing.into_comments().is_ok());
    }
}
