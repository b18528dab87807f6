use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Collection;

use super::store::{UpdateOutcome, VolunteerStore};
use super::MongoDB;
use crate::models::{VolunteerPost, VolunteerRequest, POSTS_COLLECTION, REQUESTS_COLLECTION};
use crate::utils::error::AppError;

impl MongoDB {
    fn posts(&self) -> Collection<Document> {
        self.collection(POSTS_COLLECTION)
    }

    fn requests(&self) -> Collection<Document> {
        self.collection(REQUESTS_COLLECTION)
    }

    async fn find_posts_where(&self, filter: Document) -> Result<Vec<VolunteerPost>, AppError> {
        let docs: Vec<Document> = self.posts().find(filter).await?.try_collect().await?;
        Ok(docs.into_iter().map(VolunteerPost::from).collect())
    }
}

/// Case-insensitive substring match on the title; regex metacharacters in the term are literal.
pub fn title_filter(title_search: Option<&str>) -> Document {
    match title_search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => doc! { "title": { "$regex": regex::escape(term), "$options": "i" } },
        None => doc! {},
    }
}

pub fn id_filter(id: ObjectId) -> Document {
    doc! { "_id": id }
}

pub fn organizer_filter(email: &str) -> Document {
    doc! { "organizerEmail": email }
}

pub fn volunteer_filter(email: &str) -> Document {
    doc! { "volunteerEmail": email }
}

/// Soonest deadline first. Posts without a date-typed deadline sort ahead of dated ones.
pub fn upcoming_sort() -> Document {
    doc! { "deadline": 1 }
}

pub fn upsert_update(changes: Document) -> Document {
    doc! { "$set": changes }
}

/// Matches the post only while it has a numeric `volunteersNeeded` above zero.
/// Counters stored as strings never match, so they are never claimed.
pub fn claim_filter(post_id: ObjectId) -> Document {
    doc! { "_id": post_id, "volunteersNeeded": { "$type": "number", "$gt": 0 } }
}

pub fn claim_update() -> Document {
    doc! { "$inc": { "volunteersNeeded": -1 } }
}

fn inserted_object_id(inserted: mongodb::bson::Bson) -> Result<ObjectId, AppError> {
    inserted
        .as_object_id()
        .ok_or_else(|| AppError::DatabaseError("Store returned a non-ObjectId _id".into()))
}

#[async_trait]
impl VolunteerStore for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        self.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_posts(&self, title_search: Option<&str>) -> Result<Vec<VolunteerPost>, AppError> {
        self.find_posts_where(title_filter(title_search)).await
    }

    async fn find_post(&self, id: ObjectId) -> Result<Option<VolunteerPost>, AppError> {
        let found = self.posts().find_one(id_filter(id)).await?;
        Ok(found.map(VolunteerPost::from))
    }

    async fn find_posts_by_organizer(&self, email: &str) -> Result<Vec<VolunteerPost>, AppError> {
        self.find_posts_where(organizer_filter(email)).await
    }

    async fn find_upcoming_posts(&self, limit: i64) -> Result<Vec<VolunteerPost>, AppError> {
        let docs: Vec<Document> = self
            .posts()
            .find(doc! {})
            .sort(upcoming_sort())
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(VolunteerPost::from).collect())
    }

    async fn insert_post(&self, post: VolunteerPost) -> Result<ObjectId, AppError> {
        let result = self.posts().insert_one(Document::from(post)).await?;
        inserted_object_id(result.inserted_id)
    }

    async fn upsert_post(&self, id: ObjectId, changes: Document) -> Result<UpdateOutcome, AppError> {
        let result = self
            .posts()
            .update_one(id_filter(id), upsert_update(changes))
            .upsert(true)
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
            upserted_id: result.upserted_id.and_then(|id| id.as_object_id()),
        })
    }

    async fn delete_post(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self.posts().delete_one(id_filter(id)).await?;
        Ok(result.deleted_count)
    }

    async fn find_requests_by_volunteer(&self, email: &str) -> Result<Vec<VolunteerRequest>, AppError> {
        let docs: Vec<Document> = self
            .requests()
            .find(volunteer_filter(email))
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(VolunteerRequest::from).collect())
    }

    async fn insert_request(&self, request: VolunteerRequest) -> Result<ObjectId, AppError> {
        let result = self.requests().insert_one(Document::from(request)).await?;
        inserted_object_id(result.inserted_id)
    }

    async fn claim_volunteer_slot(&self, post_id: ObjectId) -> Result<bool, AppError> {
        // Single-document conditional update: the floor at zero holds under concurrency
        let result = self
            .posts()
            .update_one(claim_filter(post_id), claim_update())
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn delete_request(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self.requests().delete_one(id_filter(id)).await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn title_filter_escapes_and_ignores_blank_terms() {
        assert!(title_filter(None).is_empty());
        assert!(title_filter(Some("   ")).is_empty());

        let filter = title_filter(Some("c++ (kids)"));
        let title = filter.get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), r"c\+\+ \(kids\)");
        assert_eq!(title.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn claim_only_matches_positive_numeric_counters() {
        let post_id = ObjectId::new();
        let filter = claim_filter(post_id);

        assert_eq!(filter.get_object_id("_id").unwrap(), post_id);
        let counter = filter.get_document("volunteersNeeded").unwrap();
        assert_eq!(counter.get_str("$type").unwrap(), "number");
        assert_eq!(counter.get("$gt"), Some(&Bson::Int32(0)));

        let update = claim_update();
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get("volunteersNeeded"), Some(&Bson::Int32(-1)));
        assert_eq!(update.len(), 1);
    }

    #[test]
    fn upsert_sets_only_the_given_fields() {
        let update = upsert_update(doc! { "title": "Clinic day", "volunteersNeeded": 3_i64 });
        assert_eq!(update.len(), 1);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "Clinic day");
        assert_eq!(set.get_i64("volunteersNeeded").unwrap(), 3);
    }

    #[test]
    fn lookups_use_store_field_names() {
        let id = ObjectId::new();
        assert_eq!(id_filter(id), doc! { "_id": id });
        assert_eq!(organizer_filter("org@x.com"), doc! { "organizerEmail": "org@x.com" });
        assert_eq!(volunteer_filter("v@x.com"), doc! { "volunteerEmail": "v@x.com" });
        assert_eq!(upcoming_sort(), doc! { "deadline": 1 });
    }

    #[test]
    fn inserted_id_must_be_an_object_id() {
        let id = ObjectId::new();
        assert_eq!(inserted_object_id(Bson::ObjectId(id)).unwrap(), id);
        assert!(matches!(
            inserted_object_id(Bson::String("abc".into())),
            Err(AppError::DatabaseError(_))
        ));
    }

    // Live tests below need a reachable MongoDB (DATABASE_URL or localhost)

    async fn live_store() -> MongoDB {
        dotenv::dotenv().ok();
        let uri =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        MongoDB::new(&uri, "causebridgeDB_test").await.unwrap()
    }

    fn unique_email() -> String {
        format!("{}@live.test", ObjectId::new().to_hex())
    }

    fn live_post(title: &str, organizer: &str, needed: i64) -> VolunteerPost {
        VolunteerPost {
            id: None,
            title: Some(title.to_string()),
            organizer_email: Some(organizer.to_string()),
            deadline: Some(mongodb::bson::DateTime::now()),
            volunteers_needed: Some(needed),
            extra: doc! { "location": "Dhaka" },
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn live_post_crud() {
        let store = live_store().await;
        let organizer = unique_email();
        let marker = ObjectId::new().to_hex();

        let id = store
            .insert_post(live_post(&format!("Food Drive {}", marker), &organizer, 3))
            .await
            .unwrap();

        let found = store.find_post(id).await.unwrap().unwrap();
        assert_eq!(found.organizer_email.as_deref(), Some(organizer.as_str()));
        assert_eq!(found.extra.get_str("location").unwrap(), "Dhaka");

        let searched = store.find_posts(Some(&marker.to_uppercase())).await.unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(store.find_posts_by_organizer(&organizer).await.unwrap().len(), 1);

        let outcome = store.upsert_post(id, doc! { "volunteersNeeded": 7_i64 }).await.unwrap();
        assert_eq!((outcome.matched, outcome.modified, outcome.upserted_id), (1, 1, None));

        assert_eq!(store.delete_post(id).await.unwrap(), 1);
        assert_eq!(store.delete_post(id).await.unwrap(), 0);
        assert!(store.find_post(id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn live_upsert_creates_missing_post() {
        let store = live_store().await;
        let id = ObjectId::new();

        let outcome = store
            .upsert_post(id, doc! { "title": "Created by upsert" })
            .await
            .unwrap();
        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.upserted_id, Some(id));

        let created = store.find_post(id).await.unwrap().unwrap();
        assert_eq!(created.title.as_deref(), Some("Created by upsert"));
        store.delete_post(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn live_claim_stops_at_zero_and_skips_string_counters() {
        let store = live_store().await;

        let id = store.insert_post(live_post("Beach Cleanup", &unique_email(), 1)).await.unwrap();
        assert!(store.claim_volunteer_slot(id).await.unwrap());
        assert!(!store.claim_volunteer_slot(id).await.unwrap());
        let post = store.find_post(id).await.unwrap().unwrap();
        assert_eq!(post.volunteers_needed, Some(0));
        store.delete_post(id).await.unwrap();

        let legacy = ObjectId::new();
        store
            .posts()
            .insert_one(doc! { "_id": legacy, "title": "Legacy", "volunteersNeeded": "5" })
            .await
            .unwrap();
        assert!(!store.claim_volunteer_slot(legacy).await.unwrap());
        let post = store.find_post(legacy).await.unwrap().unwrap();
        assert_eq!(post.extra.get_str("volunteersNeeded").unwrap(), "5");
        store.delete_post(legacy).await.unwrap();

        assert!(!store.claim_volunteer_slot(ObjectId::new()).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn live_upcoming_is_sorted_and_limited() {
        let store = live_store().await;
        let organizer = unique_email();
        let mut ids = Vec::new();
        for _ in 0..7 {
            ids.push(store.insert_post(live_post("Upcoming", &organizer, 2)).await.unwrap());
        }

        let upcoming = store.find_upcoming_posts(6).await.unwrap();
        assert_eq!(upcoming.len(), 6);
        let dated: Vec<_> = upcoming.iter().filter_map(|p| p.deadline).collect();
        assert!(dated.windows(2).all(|w| w[0] <= w[1]));
        let first_dated = upcoming.iter().position(|p| p.deadline.is_some()).unwrap_or(6);
        assert!(upcoming[first_dated..].iter().all(|p| p.deadline.is_some()));

        for id in ids {
            store.delete_post(id).await.unwrap();
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn live_request_lifecycle() {
        let store = live_store().await;
        let volunteer = unique_email();

        let id = store
            .insert_request(VolunteerRequest {
                id: None,
                post_id: Some(ObjectId::new()),
                volunteer_email: Some(volunteer.clone()),
                extra: doc! { "suggestion": "evenings only" },
            })
            .await
            .unwrap();

        let mine = store.find_requests_by_volunteer(&volunteer).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, Some(id));

        assert_eq!(store.delete_request(id).await.unwrap(), 1);
        assert_eq!(store.delete_request(id).await.unwrap(), 0);
    }
}
