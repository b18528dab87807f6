use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::store::{UpdateOutcome, VolunteerStore};
use crate::models::{VolunteerPost, VolunteerRequest};
use crate::utils::error::AppError;

/// In-process stand-in for MongoDB used by the handler tests.
#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<Vec<Document>>,
    requests: RwLock<Vec<Document>>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like an unreachable database.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Stores a raw post document, as another writer to the collection would.
    pub async fn seed_post(&self, doc: Document) {
        self.posts.write().await.push(doc);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.offline {
            return Err(AppError::DatabaseError("server selection timeout".into()));
        }
        Ok(())
    }

    async fn posts_matching<F>(&self, predicate: F) -> Result<Vec<VolunteerPost>, AppError>
    where
        F: Fn(&VolunteerPost) -> bool,
    {
        self.check()?;
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .cloned()
            .map(VolunteerPost::from)
            .filter(|post| predicate(post))
            .collect())
    }
}

fn has_id(doc: &Document, id: ObjectId) -> bool {
    doc.get_object_id("_id").map(|found| found == id).unwrap_or(false)
}

/// Mirrors `{ $gt: 0 }` plus `$inc: -1`: only numeric counters match and the
/// stored numeric type is kept.
fn claimed_counter(value: Option<&Bson>) -> Option<Bson> {
    match value {
        Some(Bson::Int32(n)) if *n > 0 => Some(Bson::Int32(n - 1)),
        Some(Bson::Int64(n)) if *n > 0 => Some(Bson::Int64(n - 1)),
        Some(Bson::Double(n)) if *n > 0.0 => Some(Bson::Double(n - 1.0)),
        _ => None,
    }
}

#[async_trait]
impl VolunteerStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }

    async fn find_posts(&self, title_search: Option<&str>) -> Result<Vec<VolunteerPost>, AppError> {
        let term = title_search
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self.posts_matching(|post| match &term {
            Some(term) => post
                .title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(term.as_str())),
            None => true,
        })
        .await
    }

    async fn find_post(&self, id: ObjectId) -> Result<Option<VolunteerPost>, AppError> {
        self.check()?;
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .find(|doc| has_id(doc, id))
            .cloned()
            .map(VolunteerPost::from))
    }

    async fn find_posts_by_organizer(&self, email: &str) -> Result<Vec<VolunteerPost>, AppError> {
        self.posts_matching(|post| post.organizer_email.as_deref() == Some(email))
            .await
    }

    async fn find_upcoming_posts(&self, limit: i64) -> Result<Vec<VolunteerPost>, AppError> {
        let mut posts = self.posts_matching(|_| true).await?;
        // Missing and non-date deadlines sort before dates, following BSON type order
        posts.sort_by_key(|post| post.deadline);
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn insert_post(&self, mut post: VolunteerPost) -> Result<ObjectId, AppError> {
        self.check()?;
        let id = *post.id.get_or_insert_with(ObjectId::new);
        self.posts.write().await.push(post.into());
        Ok(id)
    }

    async fn upsert_post(&self, id: ObjectId, changes: Document) -> Result<UpdateOutcome, AppError> {
        self.check()?;
        let mut posts = self.posts.write().await;

        match posts.iter_mut().find(|doc| has_id(doc, id)) {
            Some(existing) => {
                let mut modified = false;
                for (key, value) in changes {
                    if existing.get(&key) != Some(&value) {
                        existing.insert(key, value);
                        modified = true;
                    }
                }
                Ok(UpdateOutcome {
                    matched: 1,
                    modified: modified as u64,
                    upserted_id: None,
                })
            }
            None => {
                let mut created = doc! { "_id": id };
                for (key, value) in changes {
                    created.insert(key, value);
                }
                posts.push(created);
                Ok(UpdateOutcome {
                    matched: 0,
                    modified: 0,
                    upserted_id: Some(id),
                })
            }
        }
    }

    async fn delete_post(&self, id: ObjectId) -> Result<u64, AppError> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let before = posts.len();
        if let Some(pos) = posts.iter().position(|doc| has_id(doc, id)) {
            posts.remove(pos);
        }
        Ok((before - posts.len()) as u64)
    }

    async fn find_requests_by_volunteer(&self, email: &str) -> Result<Vec<VolunteerRequest>, AppError> {
        self.check()?;
        Ok(self
            .requests
            .read()
            .await
            .iter()
            .cloned()
            .map(VolunteerRequest::from)
            .filter(|request| request.volunteer_email.as_deref() == Some(email))
            .collect())
    }

    async fn insert_request(&self, mut request: VolunteerRequest) -> Result<ObjectId, AppError> {
        self.check()?;
        let id = *request.id.get_or_insert_with(ObjectId::new);
        self.requests.write().await.push(request.into());
        Ok(id)
    }

    async fn claim_volunteer_slot(&self, post_id: ObjectId) -> Result<bool, AppError> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|doc| has_id(doc, post_id)) else {
            return Ok(false);
        };

        match claimed_counter(post.get("volunteersNeeded")) {
            Some(remaining) => {
                post.insert("volunteersNeeded", remaining);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_request(&self, id: ObjectId) -> Result<u64, AppError> {
        self.check()?;
        let mut requests = self.requests.write().await;
        let before = requests.len();
        if let Some(pos) = requests.iter().position(|doc| has_id(doc, id)) {
            requests.remove(pos);
        }
        Ok((before - requests.len()) as u64)
    }
}
