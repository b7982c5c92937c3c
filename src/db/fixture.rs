//! The bundled dataset used to seed the in-memory backend and test databases.

use chrono::{DateTime, NaiveDateTime};
use serde_derive::Deserialize;

use crate::topic::Topic;

static TEST_DATA: &str = include_str!("../../fixtures/test-data.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub topics: Vec<TopicData>,
    pub users: Vec<UserData>,
    pub articles: Vec<ArticleData>,
    pub comments: Vec<CommentData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicData {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Articles are identified by their position: the first one is article 1.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleData {
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: i64,
    #[serde(default)]
    pub votes: i32,
    pub article_img_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    pub article_id: i32,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub votes: i32,
    pub created_at: i64,
}

impl Fixture {
    pub fn bundled() -> serde_json::Result<Fixture> {
        serde_json::from_str(TEST_DATA)
    }
}

impl TopicData {
    pub fn to_topic(&self) -> Topic {
        Topic {
            slug: self.slug.clone(),
            description: self.description.clone(),
        }
    }
}

/// Converts an epoch-milliseconds fixture stamp, clamping unrepresentable values to the epoch.
pub fn timestamp(millis: i64) -> NaiveDateTime {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_data_is_consistent() {
        let fixture = Fixture::bundled().unwrap();
        assert_eq!(fixture.topics.len(), 3);
        assert_eq!(fixture.articles.len(), 13);
        assert_eq!(fixture.comments.len(), 18);

        let topics: HashSet<_> = fixture.topics.iter().map(|t| t.slug.as_str()).collect();
        let users: HashSet<_> = fixture.users.iter().map(|u| u.username.as_str()).collect();
        for article in &fixture.articles {
            assert!(topics.contains(article.topic.as_str()), "{}", article.title);
            assert!(users.contains(article.author.as_str()), "{}", article.title);
        }
        for comment in &fixture.comments {
            assert!(comment.article_id >= 1);
            assert!(comment.article_id as usize <= fixture.articles.len());
            assert!(users.contains(comment.author.as_str()));
        }
    }

    #[test]
    fn topics_have_text() {
        for topic in Fixture::bundled().unwrap().topics {
            assert!(!topic.slug.is_empty());
            assert!(!topic.description.is_empty());
        }
    }

    #[test]
    fn stamps_are_milliseconds() {
        assert_eq!(
            timestamp(1594329060000).to_string(),
            "2020-07-09 21:11:00"
        );
    }
}
