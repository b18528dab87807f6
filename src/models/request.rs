use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields::{extra_to_json, json_to_extra, take_object_id, take_string, validate_email};
use crate::utils::error::{parse_object_id, AppError};

pub const REQUESTS_COLLECTION: &str = "volunteerRequests";

/// A user's request to volunteer for a post. Same typed/raw split as
/// [`super::VolunteerPost`].
#[derive(Debug, Clone, PartialEq)]
pub struct VolunteerRequest {
    pub id: Option<ObjectId>,
    pub post_id: Option<ObjectId>,
    pub volunteer_email: Option<String>,
    pub extra: Document,
}

impl From<Document> for VolunteerRequest {
    fn from(mut doc: Document) -> Self {
        let id = take_object_id(&mut doc, "_id");
        let post_id = take_object_id(&mut doc, "postId");
        let volunteer_email = take_string(&mut doc, "volunteerEmail");

        VolunteerRequest {
            id,
            post_id,
            volunteer_email,
            extra: doc,
        }
    }
}

impl From<VolunteerRequest> for Document {
    fn from(request: VolunteerRequest) -> Self {
        let mut doc = Document::new();
        if let Some(id) = request.id {
            doc.insert("_id", id);
        }
        if let Some(post_id) = request.post_id {
            doc.insert("postId", post_id);
        }
        if let Some(email) = request.volunteer_email {
            doc.insert("volunteerEmail", email);
        }
        for (key, value) in request.extra {
            if !doc.contains_key(&key) {
                doc.insert(key, value);
            }
        }
        doc
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolunteerRequest {
    pub post_id: String,
    pub volunteer_email: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl CreateVolunteerRequest {
    pub fn into_request(self) -> Result<VolunteerRequest, AppError> {
        let post_id = parse_object_id(self.post_id.trim(), "post")?;
        validate_email(&self.volunteer_email, "volunteerEmail")?;

        Ok(VolunteerRequest {
            id: None,
            post_id: Some(post_id),
            volunteer_email: Some(self.volunteer_email),
            extra: json_to_extra(self.extra)?,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerRequestResponse {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_email: Option<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl From<VolunteerRequest> for VolunteerRequestResponse {
    fn from(r: VolunteerRequest) -> Self {
        VolunteerRequestResponse {
            id: r.id.map(|id| id.to_hex()),
            post_id: r.post_id.map(|id| id.to_hex()),
            volunteer_email: r.volunteer_email,
            extra: extra_to_json(r.extra),
        }
    }
}
