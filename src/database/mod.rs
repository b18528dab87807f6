pub mod mongo_store;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use store::{VolunteerStore, UPCOMING_LIMIT};

use crate::models::{POSTS_COLLECTION, REQUESTS_COLLECTION};
use mongodb::options::{ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        // Atlas clusters run with the Stable API pinned to v1
        if uri.starts_with("mongodb+srv://") {
            let server_api = ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build();
            client_options.server_api = Some(server_api);
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes backing the by-email and deadline queries
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::{doc, Document};
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let indexes = [
            (POSTS_COLLECTION, doc! { "organizerEmail": 1 }, "volunteerPOSTS(organizerEmail)"),
            (POSTS_COLLECTION, doc! { "deadline": 1 }, "volunteerPOSTS(deadline)"),
            (REQUESTS_COLLECTION, doc! { "volunteerEmail": 1 }, "volunteerRequests(volunteerEmail)"),
            (REQUESTS_COLLECTION, doc! { "postId": 1 }, "volunteerRequests(postId)"),
        ];

        for (collection, keys, label) in indexes {
            let index = IndexModel::builder().keys(keys).build();
            match self.collection::<Document>(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}", label),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
