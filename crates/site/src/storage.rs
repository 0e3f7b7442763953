//! Hosted object storage client (Supabase-compatible REST API).
//!
//! Used by the image scripts to list the recipe image bucket and upload
//! resized or generated images.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::StorageConfig;

/// Page size of the list endpoint.
const LIST_PAGE_SIZE: usize = 1000;

/// Errors from the storage API.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("storage API error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// One file in a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredObject {
    pub name: String,
    /// `None` for folder placeholders.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

/// Storage REST client bound to one bucket.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: String,
    service_key: SecretString,
    bucket: String,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
        }
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Every file under `prefix`, following pagination.
    ///
    /// # Errors
    ///
    /// Returns error if a page request fails.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        let mut offset = 0;

        loop {
            let request = ListRequest {
                prefix,
                limit: LIST_PAGE_SIZE,
                offset,
                sort_by: SortBy {
                    column: "name",
                    order: "asc",
                },
            };

            let response = self
                .client
                .post(format!(
                    "{}/storage/v1/object/list/{}",
                    self.base_url, self.bucket
                ))
                .bearer_auth(self.service_key.expose_secret())
                .header("apikey", self.service_key.expose_secret())
                .json(&request)
                .send()
                .await?;
            let page: Vec<StoredObject> = check(response).await?.json().await?;

            let fetched = page.len();
            objects.extend(page.into_iter().filter(|o| o.id.is_some()));
            debug!(offset, fetched, "Listed storage page");

            if fetched < LIST_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        Ok(objects)
    }

    /// Upload bytes to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails.
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let response = self
            .client
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url,
                self.bucket,
                path.trim_start_matches('/')
            ))
            .bearer_auth(self.service_key.expose_secret())
            .header("apikey", self.service_key.expose_secret())
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check(response).await?;

        Ok(self.public_url(path))
    }

    /// Public URL of a file in the bucket.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        public_object_url(&self.base_url, &self.bucket, path)
    }
}

/// Public URL of `path` in `bucket` under the storage base URL.
#[must_use]
pub fn public_object_url(base_url: &str, bucket: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!(
        "{}/storage/v1/object/public/{bucket}/{}",
        base_url.trim_end_matches('/'),
        encoded.join("/")
    )
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        body,
    })
}
