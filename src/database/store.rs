use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::models::{UpdateAck, VolunteerPost, VolunteerRequest};
use crate::utils::error::AppError;

/// How many posts the upcoming-deadline showcase returns.
pub const UPCOMING_LIMIT: i64 = 6;

/// Result of an upsert-by-id on a post.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<ObjectId>,
}

impl From<UpdateOutcome> for UpdateAck {
    fn from(outcome: UpdateOutcome) -> Self {
        UpdateAck {
            acknowledged: true,
            matched_count: outcome.matched,
            modified_count: outcome.modified,
            upserted_count: outcome.upserted_id.is_some() as u64,
            upserted_id: outcome.upserted_id.map(|id| id.to_hex()),
        }
    }
}

/// Operations the HTTP layer needs from the document store.
///
/// Handlers receive this as `web::Data<dyn VolunteerStore>`, so the backing
/// store is chosen once at startup and never reached through globals.
#[async_trait]
pub trait VolunteerStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    /// All posts, or only those whose title contains `title_search` (case-insensitive).
    async fn find_posts(&self, title_search: Option<&str>) -> Result<Vec<VolunteerPost>, AppError>;

    async fn find_post(&self, id: ObjectId) -> Result<Option<VolunteerPost>, AppError>;

    async fn find_posts_by_organizer(&self, email: &str) -> Result<Vec<VolunteerPost>, AppError>;

    /// Posts ordered by ascending deadline, at most `limit` of them.
    async fn find_upcoming_posts(&self, limit: i64) -> Result<Vec<VolunteerPost>, AppError>;

    async fn insert_post(&self, post: VolunteerPost) -> Result<ObjectId, AppError>;

    /// `$set` the given fields, creating the post when `id` does not exist.
    async fn upsert_post(&self, id: ObjectId, changes: Document) -> Result<UpdateOutcome, AppError>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete_post(&self, id: ObjectId) -> Result<u64, AppError>;

    async fn find_requests_by_volunteer(&self, email: &str) -> Result<Vec<VolunteerRequest>, AppError>;

    async fn insert_request(&self, request: VolunteerRequest) -> Result<ObjectId, AppError>;

    /// Decrements `volunteersNeeded` on the post if it is above zero.
    /// Returns false when the post is missing or already at zero.
    async fn claim_volunteer_slot(&self, post_id: ObjectId) -> Result<bool, AppError>;

    async fn delete_request(&self, id: ObjectId) -> Result<u64, AppError>;
}
