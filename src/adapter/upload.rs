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

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::BlobStorage;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::provider::{BlobKey, PutRequest};

/// Metadata extracted from an attached file. Only `mime_type` is consumed.
pub type Metadata = HashMap<String, Value>;

/// A blob stored by a [`BlobStorage`], addressed by its identifier.
#[derive(Debug, Clone)]
pub struct StoredBlob<'a> {
    storage: &'a BlobStorage,
    id: String,
}

impl<'a> StoredBlob<'a> {
    pub fn new(storage: &'a BlobStorage, id: impl Into<String>) -> Self {
        Self {
            storage,
            id: id.into(),
        }
    }

    pub fn storage(&self) -> &'a BlobStorage {
        self.storage
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> BlobKey {
        self.storage.key(&self.id)
    }
}

/// Content of an upload.
#[derive(Debug, Clone)]
pub enum Content<'a> {
    /// Bytes held by the caller
    Bytes(Bytes),
    /// A blob already stored by another adapter
    Stored(StoredBlob<'a>),
}

impl From<Bytes> for Content<'_> {
    fn from(bytes: Bytes) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Content<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Content<'_> {
    fn from(text: String) -> Self {
        Content::Bytes(Bytes::from(text))
    }
}

impl From<&[u8]> for Content<'_> {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for Content<'_> {
    fn from(text: &str) -> Self {
        Content::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl<'a> From<StoredBlob<'a>> for Content<'a> {
    fn from(blob: StoredBlob<'a>) -> Self {
        Content::Stored(blob)
    }
}

/// Per-call options merged over the computed upload defaults.
///
/// `key`, `public` and `content_type` replace the computed values. Every other
/// entry is handed to the backend as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadOptions {
    options: HashMap<String, String>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Apply these options on top of `request`; caller values win.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigError`] if `public` is not a boolean.
    pub fn merge_into(self, request: &mut PutRequest) -> StorageResult<()> {
        for (name, value) in self.options {
            match name.as_str() {
                "key" => request.key = BlobKey::new(value),
                "public" => {
                    request.public = value.parse::<bool>().map_err(|_| {
                        StorageError::ConfigError(format!(
                            "Upload option 'public' must be true or false, got '{}'",
                            value
                        ))
                    })?;
                }
                "content_type" => request.content_type = Some(value),
                _ => {
                    request.options.insert(name, value);
                }
            }
        }
        Ok(())
    }
}

fn mime_type(metadata: Option<&Metadata>) -> Option<String> {
    metadata?
        .get("mime_type")
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl BlobStorage {
    /// Store `content` under `id`.
    ///
    /// A [`Content::Stored`] source whose storage has the same provider as this
    /// one is copied natively by the backend; its bytes never pass through this
    /// process and `metadata`/`options` are not applied. Any other content is
    /// written with a single create call.
    ///
    /// # Errors
    ///
    /// Backend failures propagate unchanged. Nothing is retried and a failed
    /// write is not cleaned up.
    pub async fn upload<'a>(
        &self,
        content: impl Into<Content<'a>>,
        id: &str,
        metadata: Option<&Metadata>,
        options: UploadOptions,
    ) -> StorageResult<()> {
        match content.into() {
            Content::Stored(source) if self.is_copyable(&source) => self.copy(&source, id).await,
            Content::Stored(source) => {
                let body = source.storage().read(source.id()).await?;
                self.put(body, id, metadata, options).await
            }
            Content::Bytes(body) => self.put(body, id, metadata, options).await,
        }
    }

    fn is_copyable(&self, source: &StoredBlob<'_>) -> bool {
        source.storage().provider() == self.provider()
    }

    async fn copy(&self, source: &StoredBlob<'_>, id: &str) -> StorageResult<()> {
        let from = source.key();
        let to = self.key(id);
        let source_directory = source.storage().directory();

        source_directory.head(&from).await?;
        debug!(
            "Copying from={}/{} to={}/{}",
            source_directory.name(),
            from,
            self.directory.name(),
            to
        );
        source_directory
            .copy(&from, self.directory.name(), &to)
            .await
    }

    async fn put(
        &self,
        body: Bytes,
        id: &str,
        metadata: Option<&Metadata>,
        options: UploadOptions,
    ) -> StorageResult<()> {
        let mut request = PutRequest {
            key: self.key(id),
            body,
            public: self.public,
            content_type: mime_type(metadata),
            options: HashMap::new(),
        };
        options.merge_into(&mut request)?;

        debug!(
            "Uploading key={}, size={}, content_type={:?}",
            request.key,
            request.body.len(),
            request.content_type
        );
        self.directory.create(request).await
    }
}
