use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::{
    extra_to_json, json_to_extra, take_count, take_datetime, take_object_id, take_string,
    to_bson_datetime, to_chrono, validate_email, validate_title, validate_volunteers_needed,
};
use crate::utils::error::AppError;

pub const POSTS_COLLECTION: &str = "volunteerPOSTS";

/// A volunteer-needed post as stored in MongoDB.
///
/// Known fields are typed when the stored value has the expected type. Any
/// other field, or a known field stored with another type, stays in `extra`
/// and is returned as it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct VolunteerPost {
    pub id: Option<ObjectId>,
    pub title: Option<String>,
    pub organizer_email: Option<String>,
    pub deadline: Option<bson::DateTime>,
    pub volunteers_needed: Option<i64>,
    pub extra: Document,
}

impl From<Document> for VolunteerPost {
    fn from(mut doc: Document) -> Self {
        let id = take_object_id(&mut doc, "_id");
        let title = take_string(&mut doc, "title");
        let organizer_email = take_string(&mut doc, "organizerEmail");
        let deadline = take_datetime(&mut doc, "deadline");
        let volunteers_needed = take_count(&mut doc, "volunteersNeeded");

        VolunteerPost {
            id,
            title,
            organizer_email,
            deadline,
            volunteers_needed,
            extra: doc,
        }
    }
}

impl From<VolunteerPost> for Document {
    fn from(post: VolunteerPost) -> Self {
        let mut doc = Document::new();
        if let Some(id) = post.id {
            doc.insert("_id", id);
        }
        if let Some(title) = post.title {
            doc.insert("title", title);
        }
        if let Some(email) = post.organizer_email {
            doc.insert("organizerEmail", email);
        }
        if let Some(deadline) = post.deadline {
            doc.insert("deadline", deadline);
        }
        if let Some(count) = post.volunteers_needed {
            doc.insert("volunteersNeeded", count);
        }
        for (key, value) in post.extra {
            if !doc.contains_key(&key) {
                doc.insert(key, value);
            }
        }
        doc
    }
}

/// Body of `POST /add-volunteer-needed-post`.
///
/// `deadline` accepts any RFC 3339 offset and is stored as a BSON date, so it
/// reads back in UTC at millisecond precision.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub organizer_email: String,
    #[schema(value_type = String, format = DateTime)]
    pub deadline: DateTime<Utc>,
    pub volunteers_needed: i64,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl CreatePostRequest {
    pub fn into_post(self) -> Result<VolunteerPost, AppError> {
        validate_title(&self.title)?;
        validate_email(&self.organizer_email, "organizerEmail")?;
        validate_volunteers_needed(self.volunteers_needed)?;

        Ok(VolunteerPost {
            id: None,
            title: Some(self.title),
            organizer_email: Some(self.organizer_email),
            deadline: Some(to_bson_datetime(self.deadline)),
            volunteers_needed: Some(self.volunteers_needed),
            extra: json_to_extra(self.extra)?,
        })
    }
}

/// Body of `PATCH /update-my-posts/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub organizer_email: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub deadline: Option<DateTime<Utc>>,
    pub volunteers_needed: Option<i64>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl UpdatePostRequest {
    /// Builds the `$set` document. Known fields win over same-named extras.
    pub fn into_changes(self) -> Result<Document, AppError> {
        let mut changes = json_to_extra(self.extra)?;

        if let Some(title) = self.title {
            validate_title(&title)?;
            changes.insert("title", title);
        }
        if let Some(email) = self.organizer_email {
            validate_email(&email, "organizerEmail")?;
            changes.insert("organizerEmail", email);
        }
        if let Some(deadline) = self.deadline {
            changes.insert("deadline", to_bson_datetime(deadline));
        }
        if let Some(count) = self.volunteers_needed {
            validate_volunteers_needed(count)?;
            changes.insert("volunteersNeeded", count);
        }

        if changes.is_empty() {
            return Err(AppError::InvalidRequest("No fields to update".into()));
        }
        Ok(changes)
    }
}

/// A post as returned by the API. Typed fields that were not present with
/// their expected type are omitted; the stored value, if any, comes through
/// `extra`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerPostResponse {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteers_needed: Option<i64>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl From<VolunteerPost> for VolunteerPostResponse {
    fn from(p: VolunteerPost) -> Self {
        VolunteerPostResponse {
            id: p.id.map(|id| id.to_hex()),
            title: p.title,
            organizer_email: p.organizer_email,
            deadline: p.deadline.and_then(to_chrono),
            volunteers_needed: p.volunteers_needed,
            extra: extra_to_json(p.extra),
        }
    }
}
