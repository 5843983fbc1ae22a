pub mod error;
pub mod fetcher;
pub mod ids;
pub mod memory;
pub mod model;
pub mod repository;

use log::{info, warn};
use mongodb::Client;

pub use error::{IdError, PersistError, RunError, StoreError};
pub use fetcher::{DocumentFetcher, FetchOutcome, MissPolicy, RunSummary};
pub use memory::MemoryStore;
pub use model::Document;
pub use repository::{DocumentRepository, DocumentStore};

pub const DEFAULT_MONGO_URL: &str = "mongodb://localhost:30038/";
pub const DEFAULT_DATABASE: &str = "PlanetoidGenDocs";
pub const DEFAULT_COLLECTION: &str = "FileContent";
pub const DEFAULT_BUCKET: &str = "fs";

/// Where the `FileContent` documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
    pub bucket: String,
}

/// Opens the store and checks the server answers before any lookup is made.
pub async fn initialize_db(config: &StoreConfig) -> Result<DocumentRepository, StoreError> {
    info!("Connecting to MongoDB at {}", config.url);
    let client = Client::with_uri_str(&config.url)
        .await
        .map_err(StoreError::Connect)?;

    let collections = client
        .database(&config.database)
        .list_collection_names()
        .await
        .map_err(StoreError::Connect)?;

    if collections.iter().any(|c| *c == config.collection) {
        info!(
            "Using collection '{}' in '{}'.",
            config.collection, config.database
        );
    } else {
        warn!(
            "Collection '{}' does not exist in '{}'; every lookup will miss.",
            config.collection, config.database
        );
    }

    Ok(DocumentRepository::new(client, config))
}
