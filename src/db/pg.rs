//! Postgres repository backed by Diesel and an r2d2 connection pool.
//!
//! Diesel connections are blocking, so every call checks a connection out
//! of the pool on Rocket's blocking thread pool.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{delete, insert_into, select, sql_query};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use futures::future::try_join;
use log::{debug, error, warn};
use rocket::tokio::task;

use super::fixture::{self, Fixture};
use super::schema::{articles, comments, topics, users};
use super::{ArticleComments, DbResult, ErrorKind, Pool, Repository, Result};
use crate::article::{Article, ArticleSummary, SELECT_ARTICLE_SUMMARIES};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::types::{ApiError, USERNAME_NOT_FOUND};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Clone)]
pub struct PgRepository {
    pool: Pool,
}

impl PgRepository {
    pub fn new(pool: Pool) -> Self {
        PgRepository { pool }
    }

    pub fn run_migrations(&self) -> Result<()> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| ErrorKind::Migration(e.to_string()))?;
        for migration in applied {
            debug!("applied migration {}", migration);
        }
        Ok(())
    }

    /// Replaces every row with the fixture's, restarting the id sequences so
    /// fixture positions line up with article and comment ids.
    pub fn seed(&self, fixture: &Fixture) -> Result<()> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<_, DieselError, _>(|conn| {
            sql_query("TRUNCATE comments, articles, users, topics RESTART IDENTITY CASCADE;")
                .execute(conn)?;

            let topic_rows = fixture.topics.iter().map(|t| t.to_topic()).collect::<Vec<_>>();
            insert_into(topics::table).values(&topic_rows).execute(conn)?;

            for user in &fixture.users {
                insert_into(users::table)
                    .values((
                        users::username.eq(&user.username),
                        users::name.eq(&user.name),
                        users::avatar_url.eq(&user.avatar_url),
                    ))
                    .execute(conn)?;
            }

            for article in &fixture.articles {
                insert_into(articles::table)
                    .values((
                        articles::title.eq(&article.title),
                        articles::topic.eq(&article.topic),
                        articles::author.eq(&article.author),
                        articles::body.eq(&article.body),
                        articles::created_at.eq(fixture::timestamp(article.created_at)),
                        articles::votes.eq(article.votes),
                        articles::article_img_url.eq(&article.article_img_url),
                    ))
                    .execute(conn)?;
            }

            for comment in &fixture.comments {
                insert_into(comments::table)
                    .values((
                        comments::body.eq(&comment.body),
                        comments::article_id.eq(comment.article_id),
                        comments::author.eq(&comment.author),
                        comments::votes.eq(comment.votes),
                        comments::created_at.eq(fixture::timestamp(comment.created_at)),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DbResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            debug!("{}", operation);
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            error!("{} did not complete: {}", operation, e);
            ApiError::Internal
        })?
    }
}

/// Maps a failed comment insert onto the reference it broke.
pub fn classify_insert_error(err: DieselError) -> ApiError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info) => {
            let constraint = info.constraint_name().unwrap_or_default();
            warn!("comment insert rejected by {}", constraint);
            if constraint.contains("author") {
                ApiError::NotFound(USERNAME_NOT_FOUND)
            } else if constraint.contains("article_id") {
                ApiError::ArticleNotFound
            } else {
                ApiError::Diesel(err)
            }
        }
        other => ApiError::Diesel(other),
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn topics(&self) -> DbResult<Vec<Topic>> {
        self.with_conn("select topics", |conn| {
            Ok(topics::table.select(Topic::as_select()).load::<Topic>(conn)?)
        })
        .await
    }

    async fn articles(&self) -> DbResult<Vec<ArticleSummary>> {
        self.with_conn("select articles", |conn| {
            Ok(sql_query(SELECT_ARTICLE_SUMMARIES).load::<ArticleSummary>(conn)?)
        })
        .await
    }

    async fn article(&self, article_id: i32) -> DbResult<Article> {
        self.with_conn("select article", move |conn| {
            articles::table
                .find(article_id)
                .select(Article::as_select())
                .first::<Article>(conn)
                .map_err(|e| match e {
                    DieselError::NotFound => ApiError::ArticleNotFound,
                    other => other.into(),
                })
        })
        .await
    }

    async fn article_comments(&self, article_id: i32) -> DbResult<ArticleComments> {
        let comments = self.with_conn("select article comments", move |conn| {
            Ok(comments::table
                .filter(comments::article_id.eq(article_id))
                .order((comments::created_at.desc(), comments::comment_id.desc()))
                .select(Comment::as_select())
                .load::<Comment>(conn)?)
        });
        let article_exists = self.with_conn("check article exists", move |conn| {
            Ok(select(exists(articles::table.find(article_id))).get_result::<bool>(conn)?)
        });
        let (comments, article_exists) = try_join(comments, article_exists).await?;
        Ok(ArticleComments {
            article_exists,
            comments,
        })
    }

    async fn insert_comment(&self, comment: NewComment) -> DbResult<Comment> {
        self.with_conn("insert comment", move |conn| {
            insert_into(comments::table)
                .values(&comment)
                .returning(Comment::as_returning())
                .get_result::<Comment>(conn)
                .map_err(classify_insert_error)
        })
        .await
    }

    async fn delete_comment(&self, comment_id: i32) -> DbResult<usize> {
        self.with_conn("delete comment", move |conn| {
            Ok(delete(comments::table.find(comment_id)).execute(conn)?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;

    struct Violation(&'static str);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "insert or update on table \"comments\" violates foreign key constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("comments")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn violation(constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new(Violation(constraint)),
        )
    }

    #[test]
    fn unknown_author_is_a_missing_username() {
        assert_eq!(
            classify_insert_error(violation("comments_author_fkey")),
            ApiError::NotFound(USERNAME_NOT_FOUND)
        );
    }

    #[test]
    fn unknown_article_is_a_missing_article() {
        assert_eq!(
            classify_insert_error(violation("comments_article_id_fkey")),
            ApiError::ArticleNotFound
        );
    }

    #[test]
    fn other_failures_stay_unclassified() {
        match classify_insert_error(DieselError::RollbackTransaction) {
            ApiError::Diesel(DieselError::RollbackTransaction) => {}
            other => panic!("unexpected classification: {:?}", other),
        }
    }
}
