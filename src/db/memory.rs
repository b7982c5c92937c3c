//! In-process repository seeded from the bundled fixture.
//!
//! Keeps the same ordering and reference rules as the Postgres schema so the
//! HTTP layer behaves identically against either backend.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;
use std::cmp::Reverse;

use super::fixture::{self, Fixture};
use super::{ArticleComments, DbResult, Repository};
use crate::article::{Article, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::topic::Topic;
use crate::types::{ApiError, USERNAME_NOT_FOUND};

#[derive(Debug, Default)]
struct Tables {
    topics: Vec<Topic>,
    usernames: Vec<String>,
    articles: Vec<Article>,
    comments: Vec<Comment>,
    next_comment_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn seeded(fixture: &Fixture) -> Self {
        let articles = fixture
            .articles
            .iter()
            .enumerate()
            .map(|(index, data)| Article {
                article_id: index as i32 + 1,
                title: data.title.clone(),
                topic: data.topic.clone(),
                author: data.author.clone(),
                body: data.body.clone(),
                created_at: fixture::timestamp(data.created_at),
                votes: data.votes,
                article_img_url: data.article_img_url.clone(),
            })
            .collect();
        let comments: Vec<Comment> = fixture
            .comments
            .iter()
            .enumerate()
            .map(|(index, data)| Comment {
                comment_id: index as i32 + 1,
                body: data.body.clone(),
                article_id: data.article_id,
                author: data.author.clone(),
                votes: data.votes,
                created_at: fixture::timestamp(data.created_at),
            })
            .collect();

        let tables = Tables {
            topics: fixture.topics.iter().map(|t| t.to_topic()).collect(),
            usernames: fixture.users.iter().map(|u| u.username.clone()).collect(),
            articles,
            next_comment_id: comments.len() as i32 + 1,
            comments,
        };
        MemoryRepository {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn topics(&self) -> DbResult<Vec<Topic>> {
        Ok(self.tables.read().topics.clone())
    }

    async fn articles(&self) -> DbResult<Vec<ArticleSummary>> {
        let tables = self.tables.read();
        let mut articles = tables
            .articles
            .iter()
            .map(|article| {
                let count = tables
                    .comments
                    .iter()
                    .filter(|c| c.article_id == article.article_id)
                    .count();
                ArticleSummary::from(article, count as i64)
            })
            .collect::<Vec<_>>();
        articles.sort_by_key(|a| Reverse((a.created_at, a.article_id)));
        Ok(articles)
    }

    async fn article(&self, article_id: i32) -> DbResult<Article> {
        self.tables
            .read()
            .articles
            .iter()
            .find(|a| a.article_id == article_id)
            .cloned()
            .ok_or(ApiError::ArticleNotFound)
    }

    async fn article_comments(&self, article_id: i32) -> DbResult<ArticleComments> {
        let tables = self.tables.read();
        let mut comments = tables
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect::<Vec<_>>();
        comments.sort_by_key(|c| Reverse((c.created_at, c.comment_id)));
        let article_exists = tables.articles.iter().any(|a| a.article_id == article_id);
        Ok(ArticleComments {
            article_exists,
            comments,
        })
    }

    async fn insert_comment(&self, comment: NewComment) -> DbResult<Comment> {
        let mut tables = self.tables.write();
        if !tables.articles.iter().any(|a| a.article_id == comment.article_id) {
            return Err(ApiError::ArticleNotFound);
        }
        if !tables.usernames.contains(&comment.author) {
            return Err(ApiError::NotFound(USERNAME_NOT_FOUND));
        }

        let stored = Comment {
            comment_id: tables.next_comment_id,
            body: comment.body,
            article_id: comment.article_id,
            author: comment.author,
            votes: 0,
            created_at: Utc::now().naive_utc(),
        };
        tables.next_comment_id += 1;
        tables.comments.push(stored.clone());
        debug!("stored comment {} on article {}", stored.comment_id, stored.article_id);
        Ok(stored)
    }

    async fn delete_comment(&self, comment_id: i32) -> DbResult<usize> {
        let mut tables = self.tables.write();
        let before = tables.comments.len();
        tables.comments.retain(|c| c.comment_id != comment_id);
        Ok(before - tables.comments.len())
    }
}
