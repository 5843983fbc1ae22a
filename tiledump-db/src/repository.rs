use futures_util::io::AsyncReadExt;
use log::{debug, info};
use mongodb::bson::{Bson, doc, oid::ObjectId};
use mongodb::gridfs::GridFsBucket;
use mongodb::options::GridFsBucketOptions;
use mongodb::{Client, Collection};

use crate::StoreConfig;
use crate::error::{BoxError, StoreError};
use crate::model::{Document, FileContentRecord};

/// Key-value lookup over stored documents.
///
/// `Ok(None)` means the store answered and holds no such record; any failure to
/// get an answer is an `Err`.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError>;

    async fn find_by_path(
        &self,
        local_path: &str,
        file_name: &str,
    ) -> Result<Option<Document>, StoreError>;
}

/// MongoDB-backed store over the `FileContent` collection and its GridFS bucket.
pub struct DocumentRepository {
    client: Client,
    collection: Collection<FileContentRecord>,
    bucket: GridFsBucket,
}

impl DocumentRepository {
    pub fn new(client: Client, config: &StoreConfig) -> Self {
        let database = client.database(&config.database);
        let collection = database.collection::<FileContentRecord>(&config.collection);

        let mut bucket_options = GridFsBucketOptions::default();
        bucket_options.bucket_name = Some(config.bucket.clone());
        let bucket = database.gridfs_bucket(bucket_options);

        Self {
            client,
            collection,
            bucket,
        }
    }

    /// Shuts the client down, waiting for in-flight operations to finish.
    pub async fn close(self) {
        info!("Closing document store connection.");
        self.client.shutdown().await;
    }

    async fn resolve(&self, record: FileContentRecord) -> Result<Document, StoreError> {
        match record.large_content_id().map(str::to_owned) {
            Some(content_id) => {
                let content = self.download_large_content(&record.id, &content_id).await?;
                Ok(record.into_document(content))
            }
            None => Ok(record.into_inline_document()),
        }
    }

    async fn download_large_content(
        &self,
        id: &str,
        content_id: &str,
    ) -> Result<Vec<u8>, StoreError> {
        let object_id = ObjectId::parse_str(content_id).map_err(|e| StoreError::Malformed {
            id: id.to_string(),
            reason: format!("invalid large content id '{content_id}': {e}"),
        })?;

        debug!("Downloading large content {content_id} for '{id}'");
        let download_error = |source: BoxError| {
            StoreError::Download {
                id: id.to_string(),
                content_id: content_id.to_string(),
                source,
            }
        };

        let mut stream = self
            .bucket
            .open_download_stream(Bson::ObjectId(object_id))
            .await
            .map_err(|e| download_error(Box::new(e)))?;

        let mut content = Vec::new();
        stream
            .read_to_end(&mut content)
            .await
            .map_err(|e| download_error(Box::new(e)))?;

        Ok(content)
    }
}

impl DocumentStore for DocumentRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let record = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|source| StoreError::Query {
                key: id.to_string(),
                source,
            })?;

        match record {
            Some(record) => self.resolve(record).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_path(
        &self,
        local_path: &str,
        file_name: &str,
    ) -> Result<Option<Document>, StoreError> {
        let record = self
            .collection
            .find_one(doc! { "FileName": file_name, "LocalPath": local_path })
            .await
            .map_err(|source| StoreError::Query {
                key: format!("{local_path}/{file_name}"),
                source,
            })?;

        match record {
            Some(record) => self.resolve(record).await.map(Some),
            None => Ok(None),
        }
    }
}
