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


//! Test doubles shared by the unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use reqwest::Method;
use url::Url;

use crate::adapter::BlobStorage;
use crate::storage::config::{StorageConfig, StorageType};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::fetch::{Fetcher, RemoteFile};
use crate::storage::object_store::ObjectStoreConnection;
use crate::storage::provider::{
    Blob, BlobChunks, BlobKey, BlobMetadata, Connection, Directory, PutRequest, UrlOptions,
};

/// Signs URLs as `https://blobs.test/<path>?X-Method=..&X-Expires=..&X-Signature=..`
#[derive(Debug)]
pub(crate) struct FakeSigner;

#[async_trait]
impl Signer for FakeSigner {
    async fn signed_url(
        &self,
        method: Method,
        path: &ObjectPath,
        expires_in: Duration,
    ) -> object_store::Result<Url> {
        let url = format!(
            "https://blobs.test/{}?X-Method={}&X-Expires={}&X-Signature=fake",
            path,
            method,
            expires_in.as_secs()
        );
        Url::parse(&url).map_err(|e| object_store::Error::Generic {
            store: "FakeSigner",
            source: Box::new(e),
        })
    }
}

pub(crate) fn memory_connection() -> ObjectStoreConnection {
    ObjectStoreConnection::new(StorageConfig::memory()).with_signer(Arc::new(FakeSigner))
}

/// Serves URLs from [`FakeSigner`] out of a directory of `connection`.
pub(crate) struct DirectoryFetcher {
    connection: ObjectStoreConnection,
    directory: String,
    pub(crate) opened: Arc<Mutex<Vec<Url>>>,
}

impl DirectoryFetcher {
    pub(crate) fn new(connection: &ObjectStoreConnection, directory: &str) -> Self {
        Self {
            connection: connection.clone(),
            directory: directory.to_string(),
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Fetcher for DirectoryFetcher {
    async fn open(&self, url: &Url) -> StorageResult<RemoteFile> {
        self.opened.lock().unwrap().push(url.clone());
        let key = BlobKey::new(url.path().trim_start_matches('/'));
        let chunks = self.connection.open(&self.directory)?.get_chunks(&key).await?;
        Ok(RemoteFile::new(
            url.clone(),
            Some(chunks.content_length),
            chunks.content_type,
            chunks.stream,
        ))
    }
}

pub(crate) async fn memory_storage(
    connection: &ObjectStoreConnection,
    directory: &str,
    prefix: Option<&str>,
    public: bool,
) -> BlobStorage {
    let mut builder = BlobStorage::builder(directory)
        .with_public(public)
        .with_connection(Arc::new(connection.clone()))
        .with_fetcher(Arc::new(DirectoryFetcher::new(connection, directory)));
    if let Some(prefix) = prefix {
        builder = builder.with_prefix(prefix);
    }
    builder.build().await.unwrap()
}

/// Connection whose directories log every backend call.
#[derive(Clone)]
pub(crate) struct RecordingConnection {
    inner: ObjectStoreConnection,
    pub(crate) calls: Arc<Mutex<Vec<String>>>,
    fail_destroy: Option<BlobKey>,
}

impl RecordingConnection {
    pub(crate) fn new(inner: ObjectStoreConnection) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_destroy: None,
        }
    }

    /// Make `destroy` of `key` fail with a connection error.
    pub(crate) fn failing_destroy(mut self, key: &str) -> Self {
        self.fail_destroy = Some(BlobKey::new(key));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn provider(&self) -> StorageType {
        self.inner.provider()
    }

    async fn directory(&self, name: &str) -> StorageResult<Arc<dyn Directory>> {
        self.record(format!("directory {}", name));
        let inner = self.inner.directory(name).await?;
        Ok(Arc::new(RecordingDirectory {
            inner,
            connection: self.clone(),
        }))
    }
}

struct RecordingDirectory {
    inner: Arc<dyn Directory>,
    connection: RecordingConnection,
}

#[async_trait]
impl Directory for RecordingDirectory {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn provider(&self) -> StorageType {
        self.inner.provider()
    }

    async fn head(&self, key: &BlobKey) -> StorageResult<BlobMetadata> {
        self.connection.record(format!("head {}", key));
        self.inner.head(key).await
    }

    async fn get(&self, key: &BlobKey) -> StorageResult<Blob> {
        self.connection.record(format!("get {}", key));
        self.inner.get(key).await
    }

    async fn get_chunks(&self, key: &BlobKey) -> StorageResult<BlobChunks> {
        self.connection.record(format!("get_chunks {}", key));
        self.inner.get_chunks(key).await
    }

    async fn create(&self, request: PutRequest) -> StorageResult<()> {
        self.connection.record(format!(
            "create {} public={} content_type={:?}",
            request.key, request.public, request.content_type
        ));
        self.inner.create(request).await
    }

    async fn copy(&self, from: &BlobKey, to_directory: &str, to: &BlobKey) -> StorageResult<()> {
        self.connection
            .record(format!("copy {} -> {}/{}", from, to_directory, to));
        self.inner.copy(from, to_directory, to).await
    }

    async fn destroy(&self, key: &BlobKey) -> StorageResult<()> {
        self.connection.record(format!("destroy {}", key));
        if self.connection.fail_destroy.as_ref() == Some(key) {
            return Err(StorageError::ConnectionError(format!(
                "destroy of {} refused",
                key
            )));
        }
        self.inner.destroy(key).await
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<BlobMetadata>> {
        self.connection.record(format!("list {:?}", prefix));
        self.inner.list(prefix).await
    }

    async fn sign(
        &self,
        key: &BlobKey,
        expires_in: Duration,
        options: &UrlOptions,
    ) -> StorageResult<Url> {
        self.connection
            .record(format!("sign {} {}", key, expires_in.as_secs()));
        self.inner.sign(key, expires_in, options).await
    }
}
