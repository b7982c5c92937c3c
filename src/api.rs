use lazy_static::lazy_static;
use rocket::serde::json::Json;
use rocket::{catch, get};
use serde_json::{json, Value};

use crate::types::BAD_REQUEST;

static ENDPOINTS: &str = include_str!("endpoints.json");

lazy_static! {
    static ref CATALOGUE: Value =
        serde_json::from_str(ENDPOINTS).expect("endpoints.json is valid JSON");
}

pub fn catalogue() -> &'static Value {
    &CATALOGUE
}

#[get("/")]
pub fn endpoints() -> Json<Value> {
    Json(json!({ "endpoints": catalogue() }))
}

#[catch(404)]
pub fn not_found() -> Json<Value> {
    Json(json!({ "msg": "Path not found." }))
}

#[catch(400)]
pub fn bad_request() -> Json<Value> {
    Json(json!({ "message": BAD_REQUEST }))
}

#[catch(422)]
pub fn unprocessable() -> Json<Value> {
    Json(json!({ "message": BAD_REQUEST }))
}

#[catch(500)]
pub fn internal_error() -> Json<Value> {
    Json(json!({ "message": "Internal Server Error." }))
}
