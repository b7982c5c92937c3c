use diesel::prelude::*;
use rocket::get;
use rocket::serde::json::Json;
use serde_derive::Serialize;

use crate::db::schema::topics;
use crate::db::Db;
use crate::types::ApiResult;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

#[get("/topics")]
pub async fn list(db: Db) -> ApiResult<TopicsResponse> {
    let topics = db.topics().await?;
    Ok(Json(TopicsResponse { topics }))
}
