// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.


//! Blob storage adapter
//!
//! [`BlobStorage`] implements the storage contract used by file-attachment
//! layers (upload, download, open, read, exists, delete, url, clear) on top
//! of a [`Directory`] resolved once from a [`Connection`].
//!
//! ## Modules
//!
//! - [`key`] - Identifier to key resolution
//! - [`upload`] - Native copy versus byte upload
//! - [`url`] - Public and signed URLs
//! - [`lifecycle`] - Existence checks, deletion and bulk clear

pub mod key;
pub mod lifecycle;
pub mod upload;
pub mod url;

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::config::{StorageConfig, StorageType};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::factory::ConnectionFactory;
use crate::storage::fetch::{DownloadedFile, Fetcher, HttpFetcher, RemoteFile};
use crate::storage::provider::{BlobKey, Connection, Directory, UrlOptions};

use key::KeyResolver;

pub use upload::{Content, Metadata, StoredBlob, UploadOptions};

/// Default lifetime of signed URLs, in seconds
pub const DEFAULT_EXPIRES: u64 = 3600;

fn default_public() -> bool {
    true
}

fn default_expires() -> u64 {
    DEFAULT_EXPIRES
}

/// Serializable adapter configuration.
///
/// ```
/// use blob_courier::adapter::BlobStorageOptions;
///
/// let options: BlobStorageOptions = serde_json::from_str(
///     r#"{"directory":"uploads","prefix":"cache","connection":{"type":"memory"}}"#,
/// ).unwrap();
/// assert!(options.public);
/// assert_eq!(options.expires, 3600);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlobStorageOptions {
    /// Bucket, container or local sub-directory holding the blobs
    pub directory: String,

    /// Namespace for every key of this adapter
    #[serde(default)]
    pub prefix: Option<String>,

    /// Serve unsigned URLs
    #[serde(default = "default_public")]
    pub public: bool,

    /// Signed URL lifetime in seconds
    #[serde(default = "default_expires")]
    pub expires: u64,

    /// Options to build a connection from, when none is supplied
    #[serde(default)]
    pub connection: Option<StorageConfig>,
}

impl BlobStorageOptions {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: None,
            public: default_public(),
            expires: default_expires(),
            connection: None,
        }
    }
}

/// Builder for [`BlobStorage`].
pub struct BlobStorageBuilder {
    options: BlobStorageOptions,
    connection: Option<Arc<dyn Connection>>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl BlobStorageBuilder {
    /// Creates a new builder for the given directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use blob_courier::adapter::BlobStorageBuilder;
    /// use blob_courier::storage::StorageConfig;
    ///
    /// let builder = BlobStorageBuilder::new("uploads")
    ///     .with_prefix("cache")
    ///     .with_config(StorageConfig::aws().with_option("region", "us-east-1"));
    /// ```
    pub fn new(directory: impl Into<String>) -> Self {
        Self::from_options(BlobStorageOptions::new(directory))
    }

    pub fn from_options(options: BlobStorageOptions) -> Self {
        Self {
            options,
            connection: None,
            fetcher: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.prefix = Some(prefix.into());
        self
    }

    /// Whether URLs are returned without their signature (default `true`).
    pub fn with_public(mut self, public: bool) -> Self {
        self.options.public = public;
        self
    }

    /// Lifetime of signed URLs, truncated to whole seconds.
    pub fn with_expires(mut self, expires: Duration) -> Self {
        self.options.expires = expires.as_secs();
        self
    }

    /// Use an existing connection. Takes precedence over [`with_config`](Self::with_config).
    pub fn with_connection(mut self, connection: Arc<dyn Connection>) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Build the connection from `config`.
    pub fn with_config(mut self, config: StorageConfig) -> Self {
        self.options.connection = Some(config);
        self
    }

    /// Retrieve URL content with `fetcher` instead of plain HTTP.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Resolves the directory and builds the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Neither a connection nor connection options were given
    /// * The connection cannot be built from its options
    /// * The directory cannot be resolved
    pub async fn build(self) -> StorageResult<BlobStorage> {
        let connection = match (self.connection, self.options.connection) {
            (Some(connection), _) => connection,
            (None, Some(config)) => ConnectionFactory::from_config(config).await?,
            (None, None) => {
                return Err(StorageError::ConfigError(
                    "Either a connection or connection options are required".to_string(),
                ))
            }
        };

        let directory = connection.directory(&self.options.directory).await?;
        let keys = KeyResolver::new(self.options.prefix);

        info!(
            "Built blob storage, directory={}, provider={}, prefix={:?}, public={}, expires={}s",
            directory.name(),
            connection.provider(),
            keys.prefix(),
            self.options.public,
            self.options.expires
        );

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()),
        };

        Ok(BlobStorage {
            connection,
            directory,
            keys,
            public: self.options.public,
            expires: Duration::from_secs(self.options.expires),
            fetcher,
        })
    }
}

/// Storage adapter over one directory of an object storage connection.
///
/// Connection, directory, prefix, visibility and URL lifetime are fixed at
/// construction. Every operation awaits its backend calls one after the
/// other; nothing is retried and nothing runs in the background.
pub struct BlobStorage {
    connection: Arc<dyn Connection>,
    directory: Arc<dyn Directory>,
    keys: KeyResolver,
    public: bool,
    expires: Duration,
    fetcher: Arc<dyn Fetcher>,
}

impl BlobStorage {
    /// Creates a new [`BlobStorageBuilder`] for `directory`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use blob_courier::adapter::BlobStorage;
    /// use blob_courier::storage::StorageConfig;
    ///
    /// # async fn example() -> blob_courier::storage::error::StorageResult<()> {
    /// let config = StorageConfig::aws()
    ///     .with_option("region", "us-east-1")
    ///     .with_option("access_key_id", "ACCESS_KEY")
    ///     .with_option("secret_access_key", "SECRET_KEY");
    ///
    /// let storage = BlobStorage::builder("my-bucket")
    ///     .with_prefix("store")
    ///     .with_public(false)
    ///     .with_config(config)
    ///     .build()
    ///     .await?;
    ///
    /// storage.upload(b"hello".as_slice(), "greeting.txt", None, Default::default()).await?;
    /// let url = storage.url("greeting.txt", &Default::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(directory: impl Into<String>) -> BlobStorageBuilder {
        BlobStorageBuilder::new(directory)
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    pub fn prefix(&self) -> Option<&str> {
        self.keys.prefix()
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn expires(&self) -> Duration {
        self.expires
    }

    /// Provider family of this adapter's connection.
    pub fn provider(&self) -> StorageType {
        self.connection.provider()
    }

    /// Backend key for `id`.
    pub fn key(&self, id: &str) -> BlobKey {
        self.keys.resolve(id)
    }

    /// Reference a blob of this storage as upload content for another one.
    pub fn stored(&self, id: impl Into<String>) -> StoredBlob<'_> {
        StoredBlob::new(self, id)
    }

    /// Download the blob through its current URL into a temporary file.
    pub async fn download(&self, id: &str) -> StorageResult<DownloadedFile> {
        let url = self.resolve_url(id, &UrlOptions::default()).await?;
        self.fetcher.download(&url).await
    }

    /// Open a lazy stream over the blob through its current URL.
    pub async fn open(&self, id: &str) -> StorageResult<RemoteFile> {
        let url = self.resolve_url(id, &UrlOptions::default()).await?;
        self.fetcher.open(&url).await
    }

    /// Read the blob body directly from the backend, without a URL.
    pub async fn read(&self, id: &str) -> StorageResult<Bytes> {
        let blob = self.directory.get(&self.key(id)).await?;
        Ok(blob.body)
    }

    /// Call `handler` with each chunk of the blob and its total length.
    #[deprecated(note = "use `BlobStorage::open` and read chunks from the returned `RemoteFile`")]
    pub async fn stream<F>(&self, id: &str, mut handler: F) -> StorageResult<()>
    where
        F: FnMut(Bytes, u64) + Send,
    {
        warn!("BlobStorage::stream is deprecated, use BlobStorage::open with RemoteFile::next_chunk instead");
        let mut chunks = self.directory.get_chunks(&self.key(id)).await?;
        let content_length = chunks.content_length;
        while let Some(chunk) = chunks.stream.next().await {
            handler(chunk?, content_length);
        }
        Ok(())
    }
}

impl Debug for BlobStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStorage")
            .field("directory", &self.directory)
            .field("prefix", &self.keys.prefix())
            .field("public", &self.public)
            .field("expires", &self.expires)
            .finish_non_exhaustive()
    }
}
