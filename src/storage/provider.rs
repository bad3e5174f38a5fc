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


use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use object_store::path::Path as ObjectPath;
use reqwest::Method;
use url::Url;

use super::config::StorageType;
use super::error::{StorageError, StorageResult};

/// Location of a blob inside a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobKey(String);

impl BlobKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the key to an object_store path.
    ///
    /// Only canonical keys are accepted. Empty keys, empty segments (`a//b`),
    /// leading or trailing `/`, and `.`/`..` segments are rejected rather than
    /// normalized, so two distinct keys never address the same object.
    pub fn to_path(&self) -> StorageResult<ObjectPath> {
        if self.0.is_empty() {
            return Err(StorageError::InvalidKey("key must not be empty".to_string()));
        }

        let path = ObjectPath::parse(&self.0)
            .map_err(|e| StorageError::InvalidKey(format!("{}: {}", self.0, e)))?;
        // parse strips one leading and one trailing delimiter
        if path.as_ref() != self.0 {
            return Err(StorageError::InvalidKey(format!(
                "{}: not a canonical key, would address {}",
                self.0, path
            )));
        }
        Ok(path)
    }
}

impl Display for BlobKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlobKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Metadata about a blob in storage
#[derive(Debug, Clone, PartialEq)]
pub struct BlobMetadata {
    pub key: BlobKey,

    /// Blob size in bytes
    pub size: u64,

    /// Last modified timestamp (if available)
    pub last_modified: Option<DateTime<Utc>>,

    pub e_tag: Option<String>,
}

/// A fully fetched blob.
#[derive(Debug, Clone)]
pub struct Blob {
    pub metadata: BlobMetadata,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Chunked body of a blob, as returned by [`Directory::get_chunks`].
pub struct BlobChunks {
    pub content_length: u64,
    pub content_type: Option<String>,
    pub stream: BoxStream<'static, StorageResult<Bytes>>,
}

impl Debug for BlobChunks {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BlobChunks")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A single write of a blob body, after caller options were merged.
#[derive(Debug, Clone)]
pub struct PutRequest {
    pub key: BlobKey,
    pub body: Bytes,
    pub public: bool,
    pub content_type: Option<String>,
    /// Backend-specific options, e.g. `cache_control` or `metadata.<name>`
    pub options: HashMap<String, String>,
}

/// Options passed through to the signing primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlOptions {
    /// HTTP method the URL is signed for
    pub method: Method,
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
        }
    }
}

impl UrlOptions {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

/// A session with one storage provider.
///
/// A connection hands out directory handles; it is never asked for one more
/// than once per adapter.
#[async_trait]
pub trait Connection: Send + Sync {
    /// The provider family of this connection.
    fn provider(&self) -> StorageType;

    /// Resolve a named directory (bucket, container, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be resolved with this
    /// connection's options.
    async fn directory(&self, name: &str) -> StorageResult<Arc<dyn Directory>>;
}

/// A named container of blobs.
///
/// This is the whole surface the adapter needs from a backend. Every method
/// issues the backend call directly; implementations must not retry.
#[async_trait]
pub trait Directory: Send + Sync {
    fn name(&self) -> &str;

    fn provider(&self) -> StorageType;

    /// Fetch blob metadata without the body.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if there is no blob under `key`.
    async fn head(&self, key: &BlobKey) -> StorageResult<BlobMetadata>;

    /// Fetch a blob with its whole body.
    async fn get(&self, key: &BlobKey) -> StorageResult<Blob>;

    /// Fetch a blob body as a stream of chunks.
    async fn get_chunks(&self, key: &BlobKey) -> StorageResult<BlobChunks>;

    /// Write a blob in a single call.
    async fn create(&self, request: PutRequest) -> StorageResult<()>;

    /// Copy a blob of this directory to `to` inside the directory named
    /// `to_directory` of the same provider.
    ///
    /// Backends that cannot copy between directories server-side may stream
    /// the body through this process. The object store backend does so in
    /// multipart upload parts, keeping at most a few parts (5 MiB each) in
    /// memory at a time.
    async fn copy(&self, from: &BlobKey, to_directory: &str, to: &BlobKey) -> StorageResult<()>;

    async fn destroy(&self, key: &BlobKey) -> StorageResult<()>;

    /// List blobs, optionally restricted to keys below `prefix`.
    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<BlobMetadata>>;

    /// Produce a URL for `key` that stays valid for `expires_in`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unsupported`] if the backend cannot sign URLs.
    async fn sign(
        &self,
        key: &BlobKey,
        expires_in: Duration,
        options: &UrlOptions,
    ) -> StorageResult<Url>;
}

impl Debug for dyn Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Connection(provider={})", self.provider())
    }
}

impl Debug for dyn Directory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Directory(name={}, provider={})",
            self.name(),
            self.provider()
        )
    }
}
