use chrono::{NaiveDateTime, SecondsFormat};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde::Serializer;
use serde_json::Value;

use crate::types::ApiError;

pub fn try_respond<'r, 'o: 'r>(
    req: &'r Request<'_>,
    json: Value,
    status: Status,
) -> response::Result<'o> {
    (status, Json(json)).respond_to(req)
}

/// Stored timestamps are UTC without a zone, rendered as `2020-11-03T09:12:00.000Z`.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = date.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Parses an identifier path segment.
///
/// Anything that is not an integer is a bad request. An integer outside the
/// key range can never name a stored row, so it fails with `missing` instead.
pub fn parse_id(raw: &str, missing: ApiError) -> Result<i32, ApiError> {
    let id = raw.trim().parse::<i64>().map_err(|_| ApiError::BadRequest)?;
    i32::try_from(id).map_err(|_| missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn parses_integer_ids() {
        assert_eq!(parse_id("2", ApiError::ArticleNotFound), Ok(2));
        assert_eq!(parse_id("-7", ApiError::ArticleNotFound), Ok(-7));
    }

    #[test]
    fn rejects_non_integer_ids() {
        for raw in &["not-a-number", "1.5", "", "2abc", "0x10"] {
            assert_eq!(parse_id(raw, ApiError::ArticleNotFound), Err(ApiError::BadRequest));
        }
    }

    #[test]
    fn out_of_range_ids_are_missing() {
        assert_eq!(
            parse_id("9999999999", ApiError::ArticleNotFound),
            Err(ApiError::ArticleNotFound)
        );
    }

    #[derive(serde_derive::Serialize)]
    struct Stamped {
        #[serde(serialize_with = "serialize_date")]
        created_at: NaiveDateTime,
    }

    #[test]
    fn dates_render_as_utc_millis() {
        let created_at = DateTime::from_timestamp_millis(1604394720000)
            .map(|d| d.naive_utc())
            .unwrap();
        let rendered = serde_json::to_value(Stamped { created_at }).unwrap();
        assert_eq!(rendered["created_at"], "2020-11-03T09:12:00.000Z");
    }
}
