// Conversions between loosely-typed store documents and the typed models.
// Posts and requests carry arbitrary organizer/volunteer fields next to the
// known ones, so the known keys are pulled out and the rest stays as `extra`.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};

use crate::utils::error::AppError;

// Each `take_*` removes the key only when the stored value already has the
// expected BSON type. Anything else is left in the document so it comes back
// unchanged through `extra`.

pub fn take_object_id(doc: &mut Document, key: &str) -> Option<ObjectId> {
    match doc.get(key) {
        Some(Bson::ObjectId(oid)) => {
            let oid = *oid;
            doc.remove(key);
            Some(oid)
        }
        _ => None,
    }
}

pub fn take_string(doc: &mut Document, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Bson::String(_)) => match doc.remove(key) {
            Some(Bson::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Integer counters only. Doubles and numeric strings stay raw.
pub fn take_count(doc: &mut Document, key: &str) -> Option<i64> {
    let count = match doc.get(key) {
        Some(Bson::Int32(n)) => *n as i64,
        Some(Bson::Int64(n)) => *n,
        _ => return None,
    };
    doc.remove(key);
    Some(count)
}

pub fn take_datetime(doc: &mut Document, key: &str) -> Option<bson::DateTime> {
    match doc.get(key) {
        Some(Bson::DateTime(dt)) => {
            let dt = *dt;
            doc.remove(key);
            Some(dt)
        }
        _ => None,
    }
}

pub fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

pub fn to_chrono(dt: bson::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
}

/// Extra document fields rendered as relaxed extended JSON.
pub fn extra_to_json(extra: Document) -> Map<String, Value> {
    match Bson::Document(extra).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Client-supplied extra fields as a BSON document. `_id` is never taken from the client.
pub fn json_to_extra(mut extra: Map<String, Value>) -> Result<Document, AppError> {
    extra.remove("_id");
    Ok(bson::to_document(&extra)?)
}

pub fn validate_email(email: &str, field: &str) -> Result<(), AppError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::InvalidRequest(format!(
            "{} must be a valid email address",
            field
        ))),
    }
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidRequest("title must not be empty".into()));
    }
    Ok(())
}

pub fn validate_volunteers_needed(count: i64) -> Result<(), AppError> {
    if count < 0 {
        return Err(AppError::InvalidRequest(
            "volunteersNeeded must not be negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn take_count_reads_integers_and_leaves_the_rest() {
        let mut d = doc! { "a": 3_i32, "b": 4_i64, "c": 5.0_f64, "d": "6" };
        assert_eq!(take_count(&mut d, "a"), Some(3));
        assert_eq!(take_count(&mut d, "b"), Some(4));
        assert_eq!(take_count(&mut d, "c"), None);
        assert_eq!(take_count(&mut d, "d"), None);
        assert_eq!(take_count(&mut d, "missing"), None);
        assert_eq!(d, doc! { "c": 5.0_f64, "d": "6" });
    }

    #[test]
    fn take_datetime_keeps_non_date_values_in_place() {
        let mut d = doc! {
            "deadline": bson::DateTime::from_millis(1_740_823_200_000),
            "legacy": "2025-06-01",
        };
        let dt = take_datetime(&mut d, "deadline").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_740_823_200_000);

        assert_eq!(take_datetime(&mut d, "legacy"), None);
        assert_eq!(d.get_str("legacy").unwrap(), "2025-06-01");
    }

    #[test]
    fn take_string_and_object_id_skip_other_types() {
        let mut d = doc! { "title": 42_i32, "postId": "65f0c0ffee00000000000000" };
        assert_eq!(take_string(&mut d, "title"), None);
        assert_eq!(take_object_id(&mut d, "postId"), None);
        assert_eq!(d.get_i32("title").unwrap(), 42);
        assert_eq!(d.get_str("postId").unwrap(), "65f0c0ffee00000000000000");
    }

    #[test]
    fn json_to_extra_drops_client_id() {
        let mut map = Map::new();
        map.insert("_id".into(), Value::String("forged".into()));
        map.insert("location".into(), Value::String("Dhaka".into()));

        let extra = json_to_extra(map).unwrap();
        assert!(!extra.contains_key("_id"));
        assert_eq!(extra.get_str("location").unwrap(), "Dhaka");
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@x.com", "organizerEmail").is_ok());
        assert!(validate_email("ax.com", "organizerEmail").is_err());
        assert!(validate_email("@x.com", "organizerEmail").is_err());
        assert!(validate_email("a@", "organizerEmail").is_err());
    }
}
