use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamp};
use rocket::get;
use rocket::serde::json::Json;
use serde_derive::Serialize;

use crate::db::schema::articles;
use crate::db::Db;
use crate::types::{ApiError, ApiResult};
use crate::utils::{parse_id, serialize_date};

pub static SELECT_ARTICLE_SUMMARIES: &str = "select articles.article_id as article_id,
       articles.title as title,
       articles.topic as topic,
       articles.author as author,
       articles.created_at as created_at,
       articles.votes as votes,
       articles.article_img_url as article_img_url,
       count(comments.comment_id) as comment_count
  from articles LEFT JOIN comments on comments.article_id = articles.article_id
 GROUP BY articles.article_id
 ORDER BY articles.created_at DESC, articles.article_id DESC;";

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    pub votes: i32,
    pub article_img_url: String,
}

/// A listed article: no body, plus the live number of comments.
#[derive(Debug, Clone, PartialEq, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl ArticleSummary {
    pub fn from(article: &Article, comment_count: i64) -> Self {
        ArticleSummary {
            article_id: article.article_id,
            title: article.title.clone(),
            topic: article.topic.clone(),
            author: article.author.clone(),
            created_at: article.created_at,
            votes: article.votes,
            article_img_url: article.article_img_url.clone(),
            comment_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleSummary>,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    article: Article,
}

#[get("/articles")]
pub async fn list(db: Db) -> ApiResult<ArticlesResponse> {
    let articles = db.articles().await?;
    Ok(Json(ArticlesResponse { articles }))
}

#[get("/articles/<article_id>")]
pub async fn show(db: Db, article_id: &str) -> ApiResult<ArticleResponse> {
    let article_id = parse_id(article_id, ApiError::ArticleNotFound)?;
    let article = db.article(article_id).await?;
    Ok(Json(ArticleResponse { article }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn article() -> Article {
        Article {
            article_id: 2,
            title: "Sony Vaio; or, The Laptop".to_string(),
            topic: "mitch".to_string(),
            author: "icellusedkars".to_string(),
            body: "Call me Mitchell.".to_string(),
            created_at: DateTime::from_timestamp_millis(1602828180000)
                .unwrap()
                .naive_utc(),
            votes: 0,
            article_img_url: "https://example.com/vaio.jpg".to_string(),
        }
    }

    #[test]
    fn summary_drops_the_body() {
        let summary = serde_json::to_value(ArticleSummary::from(&article(), 3)).unwrap();
        assert!(summary.get("body").is_none());
        assert_eq!(summary["comment_count"], 3);
        assert_eq!(summary["article_id"], 2);
    }

    #[test]
    fn full_article_keeps_the_body() {
        let full = serde_json::to_value(article()).unwrap();
        assert_eq!(full["body"], "Call me Mitchell.");
        assert_eq!(full["created_at"], "2020-10-16T06:03:00.000Z");
        assert!(full.get("comment_count").is_none());
    }
}
