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


use super::config::{StorageConfig, StorageType};
use super::error::{StorageError, StorageResult};
use super::provider::{
    Blob, BlobChunks, BlobKey, BlobMetadata, Connection, Directory, PutRequest, UrlOptions,
};
use async_trait::async_trait;
use futures::stream::StreamExt;
use object_store::{
    aws::AmazonS3Builder, azure::MicrosoftAzureBuilder, gcp::GoogleCloudStorageBuilder,
    local::LocalFileSystem, memory::InMemory, signer::Signer, Attribute, Attributes,
    ClientOptions, ObjectMeta, ObjectStore, PutMultipartOpts, PutOptions, PutPayload, RetryConfig,
    WriteMultipart,
};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Options consumed by `build_connection_options`, never by the store builders
const CLIENT_OPTION_KEYS: [&str; 4] = [
    "timeout",
    "connect_timeout",
    "pool_idle_timeout",
    "pool_max_idle_per_host",
];

/// Parts in flight while streaming a copy between directories
const COPY_MAX_CONCURRENT_PARTS: usize = 4;

type BuiltStore = (Arc<dyn ObjectStore>, Option<Arc<dyn Signer>>);

/// Connection to any object_store backend
///
/// The connection holds the provider options; each [`Directory`] it resolves
/// is an object store bound to one bucket, container or local sub-directory.
/// Memory directories with the same name share their contents across every
/// handle resolved from the same connection (and its clones).
#[derive(Clone)]
pub struct ObjectStoreConnection {
    config: StorageConfig,
    signer: Option<Arc<dyn Signer>>,
    memory: Arc<Mutex<HashMap<String, Arc<InMemory>>>>,
}

impl ObjectStoreConnection {
    /// Create a connection from configuration.
    ///
    /// No backend call is made; credentials are only exercised once a
    /// directory is used.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            signer: None,
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sign URLs with `signer` instead of the store's own signing, e.g. for a
    /// CDN in front of the bucket or for stores that cannot sign at all.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Resolve a directory handle.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The directory name is empty
    /// * Required configuration options are missing for the storage type
    /// * A local directory does not exist
    /// * The object store backend cannot be initialized
    pub fn open(&self, name: &str) -> StorageResult<ObjectStoreDirectory> {
        if name.is_empty() {
            return Err(StorageError::ConfigError(
                "Directory name must not be empty".to_string(),
            ));
        }

        let (store, own_signer) = match self.config.storage_type {
            StorageType::Local => Self::build_local_store(&self.config, name)?,
            StorageType::Aws => Self::build_aws_store(&self.config, name)?,
            StorageType::Azure => Self::build_azure_store(&self.config, name)?,
            StorageType::Gcs => Self::build_gcs_store(&self.config, name)?,
            StorageType::Memory => self.build_memory_store(name),
        };

        Ok(ObjectStoreDirectory {
            name: name.to_string(),
            provider: self.config.storage_type,
            connection: self.clone(),
            store,
            signer: self.signer.clone().or(own_signer),
        })
    }

    /// Build a local filesystem store rooted at `<path>/<name>`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The 'path' option is missing from configuration
    /// * The directory cannot be canonicalized (doesn't exist or permission denied)
    /// * The directory is not a directory
    fn build_local_store(config: &StorageConfig, name: &str) -> StorageResult<BuiltStore> {
        let path = config.options.get("path").ok_or_else(|| {
            StorageError::ConfigError("Local storage requires 'path' option".to_string())
        })?;
        let directory_path = PathBuf::from(path).join(name);

        // Canonicalize the path (handles both relative and absolute paths, resolves symlinks)
        let canonical_path = directory_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to resolve directory '{}': {} (directory must exist)",
                directory_path.display(),
                e
            ))
        })?;

        if !canonical_path.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "Directory path is not a directory: {}",
                canonical_path.display()
            )));
        }

        let store = LocalFileSystem::new_with_prefix(&canonical_path).map_err(|e| {
            StorageError::ConfigError(format!("Failed to create local store: {}", e))
        })?;

        let store: Arc<dyn ObjectStore> = Arc::new(store);
        Ok((store, None))
    }

    fn build_memory_store(&self, name: &str) -> BuiltStore {
        let store = self
            .memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone();
        let store: Arc<dyn ObjectStore> = store;
        (store, None)
    }

    /// Build connection options from configuration.
    ///
    /// # Returns
    ///
    /// A `ClientOptions` instance configured with timeout and connection settings from the config.
    fn build_connection_options(config: &StorageConfig) -> ClientOptions {
        let mut client_options = ClientOptions::default();
        if let Some(timeout_str) = config.options.get("timeout") {
            if timeout_str == "0" || timeout_str == "disabled" {
                client_options = client_options.with_timeout_disabled();
            } else if let Ok(sec) = timeout_str.parse::<u64>() {
                client_options = client_options.with_timeout(Duration::from_secs(sec))
            }
        };
        if let Some(connect_timeout_str) = config.options.get("connect_timeout") {
            if connect_timeout_str == "0" || connect_timeout_str == "disabled" {
                client_options = client_options.with_connect_timeout_disabled();
            } else if let Ok(sec) = connect_timeout_str.parse::<u64>() {
                client_options = client_options.with_connect_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_idle_timeout_str) = config.options.get("pool_idle_timeout") {
            if let Ok(sec) = pool_idle_timeout_str.parse::<u64>() {
                client_options = client_options.with_pool_idle_timeout(Duration::from_secs(sec))
            }
        }
        if let Some(pool_max_idle_per_host_str) = config.options.get("pool_max_idle_per_host") {
            if let Ok(max_idle) = pool_max_idle_per_host_str.parse::<usize>() {
                client_options = client_options.with_pool_max_idle_per_host(max_idle)
            }
        }
        client_options
    }

    /// Transient failures surface to the caller unchanged.
    fn build_retry_options() -> RetryConfig {
        RetryConfig {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Build an AWS S3 store for `bucket`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * AWS credentials are invalid
    /// * The S3 store cannot be initialized
    fn build_aws_store(config: &StorageConfig, bucket: &str) -> StorageResult<BuiltStore> {
        let mut builder = AmazonS3Builder::new()
            .with_client_options(Self::build_connection_options(config))
            .with_retry(Self::build_retry_options())
            .with_bucket_name(bucket);

        for (key, value) in &config.options {
            match key.as_str() {
                "region" => builder = builder.with_region(value),
                "access_key_id" => builder = builder.with_access_key_id(value),
                "secret_access_key" => builder = builder.with_secret_access_key(value),
                "session_token" | "token" => builder = builder.with_token(value),
                "endpoint" => builder = builder.with_endpoint(value),
                "allow_http" => {
                    if value.to_lowercase() == "true" {
                        builder = builder.with_allow_http(true);
                    }
                }
                "bucket" => warn!(
                    "Ignoring AWS S3 option bucket={}, using directory={}",
                    value, bucket
                ),
                key if CLIENT_OPTION_KEYS.contains(&key) => (),
                _ => warn!("Unknown AWS S3 option: {}", key),
            }
        }

        let store = Arc::new(
            builder.build().map_err(|e| {
                StorageError::ConfigError(format!("Failed to create S3 store: {}", e))
            })?,
        );

        let signer: Arc<dyn Signer> = store.clone();
        let store: Arc<dyn ObjectStore> = store;
        Ok((store, Some(signer)))
    }

    /// Build an Azure store for `container`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The 'account_name' option is missing
    /// * Azure credentials are invalid
    /// * The Azure store cannot be initialized
    fn build_azure_store(config: &StorageConfig, container: &str) -> StorageResult<BuiltStore> {
        let account_name = config.get_option("account_name").ok_or_else(|| {
            StorageError::ConfigError("Azure requires 'account_name' option".to_string())
        })?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_client_options(Self::build_connection_options(config))
            .with_retry(Self::build_retry_options())
            .with_account(account_name)
            .with_container_name(container);

        for (key, value) in &config.options {
            match key.as_str() {
                "account_name" => (),
                "access_key" | "account_key" => builder = builder.with_access_key(value),
                "sas_token" => {
                    // Parse SAS token query parameters
                    let pairs: Vec<(String, String)> = value
                        .trim_start_matches('?')
                        .split('&')
                        .filter_map(|pair| {
                            let mut parts = pair.split('=');
                            match (parts.next(), parts.next()) {
                                (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
                                _ => None,
                            }
                        })
                        .collect();
                    builder = builder.with_sas_authorization(pairs);
                }
                "tenant_id" => builder = builder.with_tenant_id(value),
                "client_id" => builder = builder.with_client_id(value),
                "client_secret" => builder = builder.with_client_secret(value),
                "use_fabric_endpoint" => {
                    builder = builder.with_use_fabric_endpoint(value.to_lowercase() == "true");
                }
                "endpoint" => builder = builder.with_endpoint(value.clone()),
                "container" => warn!(
                    "Ignoring Azure option container={}, using directory={}",
                    value, container
                ),
                key if CLIENT_OPTION_KEYS.contains(&key) => (),
                _ => warn!("Unknown Azure option: {}", key),
            }
        }

        let store = Arc::new(builder.build().map_err(|e| {
            StorageError::ConfigError(format!("Failed to create Azure store: {}", e))
        })?);

        let signer: Arc<dyn Signer> = store.clone();
        let store: Arc<dyn ObjectStore> = store;
        Ok((store, Some(signer)))
    }

    /// Build a GCS store for `bucket`.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * GCS credentials are invalid
    /// * The GCS store cannot be initialized
    fn build_gcs_store(config: &StorageConfig, bucket: &str) -> StorageResult<BuiltStore> {
        let mut builder = GoogleCloudStorageBuilder::new()
            .with_client_options(Self::build_connection_options(config))
            .with_retry(Self::build_retry_options())
            .with_bucket_name(bucket);

        for (key, value) in &config.options {
            match key.as_str() {
                "service_account_key_path" => builder = builder.with_service_account_path(value),
                "service_account_key" => builder = builder.with_service_account_key(value),
                "bucket" => warn!(
                    "Ignoring GCS option bucket={}, using directory={}",
                    value, bucket
                ),
                key if CLIENT_OPTION_KEYS.contains(&key) => (),
                _ => warn!("Unknown GCS option: {}", key),
            }
        }

        let store = Arc::new(
            builder.build().map_err(|e| {
                StorageError::ConfigError(format!("Failed to create GCS store: {}", e))
            })?,
        );

        let signer: Arc<dyn Signer> = store.clone();
        let store: Arc<dyn ObjectStore> = store;
        Ok((store, Some(signer)))
    }
}

#[async_trait]
impl Connection for ObjectStoreConnection {
    fn provider(&self) -> StorageType {
        self.config.storage_type
    }

    async fn directory(&self, name: &str) -> StorageResult<Arc<dyn Directory>> {
        let directory = self.open(name)?;
        info!(
            "Resolved directory={}, provider={}, signing={}",
            name,
            self.provider(),
            directory.signer.is_some()
        );
        Ok(Arc::new(directory))
    }
}

impl Debug for ObjectStoreConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Option values may hold credentials
        let mut option_keys: Vec<&String> = self.config.options.keys().collect();
        option_keys.sort();
        write!(
            f,
            "ObjectStoreConnection(provider={}, options={:?}, custom_signer={})",
            self.config.storage_type_str(),
            option_keys,
            self.signer.is_some()
        )
    }
}

/// A directory backed by one object store
pub struct ObjectStoreDirectory {
    name: String,
    provider: StorageType,
    connection: ObjectStoreConnection,
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
}

impl ObjectStoreDirectory {
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    fn to_metadata(meta: ObjectMeta) -> BlobMetadata {
        BlobMetadata {
            key: BlobKey::new(meta.location.to_string()),
            size: meta.size,
            last_modified: Some(meta.last_modified),
            e_tag: meta.e_tag,
        }
    }

    fn content_type(attributes: &Attributes) -> Option<String> {
        attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string())
    }

    /// Translate a put request into object_store attributes.
    fn build_attributes(&self, request: &PutRequest) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(content_type) = &request.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }

        for (name, value) in &request.options {
            let attribute = match name.as_str() {
                "cache_control" => Attribute::CacheControl,
                "content_disposition" => Attribute::ContentDisposition,
                "content_encoding" => Attribute::ContentEncoding,
                "content_language" => Attribute::ContentLanguage,
                other => match other.strip_prefix("metadata.") {
                    Some(meta_name) if !meta_name.is_empty() => {
                        Attribute::Metadata(meta_name.to_string().into())
                    }
                    _ => {
                        warn!("Unknown upload option: {}", other);
                        continue;
                    }
                },
            };
            attributes.insert(attribute, value.clone().into());
        }

        // LocalFileSystem rejects puts carrying attributes
        if self.provider == StorageType::Local && !attributes.is_empty() {
            debug!(
                "Dropping count={} attributes for key={}, local storage does not persist them",
                attributes.len(),
                request.key
            );
            return Attributes::new();
        }

        attributes
    }
}

#[async_trait]
impl Directory for ObjectStoreDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> StorageType {
        self.provider
    }

    async fn head(&self, key: &BlobKey) -> StorageResult<BlobMetadata> {
        let meta = self.store.head(&key.to_path()?).await?;
        Ok(Self::to_metadata(meta))
    }

    async fn get(&self, key: &BlobKey) -> StorageResult<Blob> {
        let result = self.store.get(&key.to_path()?).await?;
        let content_type = Self::content_type(&result.attributes);
        let metadata = Self::to_metadata(result.meta.clone());
        let body = result.bytes().await?;

        Ok(Blob {
            metadata,
            content_type,
            body,
        })
    }

    async fn get_chunks(&self, key: &BlobKey) -> StorageResult<BlobChunks> {
        let result = self.store.get(&key.to_path()?).await?;
        let content_type = Self::content_type(&result.attributes);
        let content_length = result.meta.size;
        let stream = result
            .into_stream()
            .map(|chunk| chunk.map_err(StorageError::from))
            .boxed();

        Ok(BlobChunks {
            content_length,
            content_type,
            stream,
        })
    }

    async fn create(&self, request: PutRequest) -> StorageResult<()> {
        let path = request.key.to_path()?;
        let attributes = self.build_attributes(&request);
        if request.public {
            // object_store has no per-object ACL; visibility is a bucket policy
            debug!("Writing key={} to public directory={}", request.key, self.name);
        }

        let options = PutOptions {
            attributes,
            ..Default::default()
        };
        self.store
            .put_opts(&path, PutPayload::from(request.body), options)
            .await?;
        Ok(())
    }

    async fn copy(&self, from: &BlobKey, to_directory: &str, to: &BlobKey) -> StorageResult<()> {
        let from_path = from.to_path()?;
        let to_path = to.to_path()?;

        if to_directory == self.name {
            self.store.copy(&from_path, &to_path).await?;
            return Ok(());
        }

        // object_store copies server-side only within a single store
        let target = self.connection.open(to_directory)?;
        debug!(
            "Copying across directories from={}/{} to={}/{}",
            self.name, from, to_directory, to
        );
        let result = self.store.get(&from_path).await?;
        let attributes = if target.provider == StorageType::Local {
            Attributes::new()
        } else {
            result.attributes.clone()
        };
        let options = PutMultipartOpts {
            attributes,
            ..Default::default()
        };
        let upload = target.store.put_multipart_opts(&to_path, options).await?;
        let mut writer = WriteMultipart::new(upload);
        let mut chunks = result.into_stream();

        while let Some(chunk) = chunks.next().await {
            let written = match chunk {
                Ok(chunk) => writer
                    .wait_for_capacity(COPY_MAX_CONCURRENT_PARTS)
                    .await
                    .map(|_| writer.write(&chunk)),
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                if let Err(abort) = writer.abort().await {
                    warn!(
                        "Failed to abort copy to={}/{}: {}",
                        to_directory, to, abort
                    );
                }
                return Err(e.into());
            }
        }

        writer.finish().await?;
        Ok(())
    }

    async fn destroy(&self, key: &BlobKey) -> StorageResult<()> {
        self.store.delete(&key.to_path()?).await?;
        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<BlobMetadata>> {
        let prefix_path = prefix.map(|p| BlobKey::new(p).to_path()).transpose()?;

        let mut blobs = Vec::new();
        let mut stream = self.store.list(prefix_path.as_ref());
        while let Some(meta) = stream.next().await {
            blobs.push(Self::to_metadata(meta?));
        }

        debug!(
            "Listed directory={}, prefix={:?}, found count={} blobs",
            self.name,
            prefix,
            blobs.len()
        );
        Ok(blobs)
    }

    async fn sign(
        &self,
        key: &BlobKey,
        expires_in: Duration,
        options: &UrlOptions,
    ) -> StorageResult<Url> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            StorageError::Unsupported(format!(
                "{} storage cannot sign URLs without a configured signer",
                self.provider
            ))
        })?;

        let url = signer
            .signed_url(options.method.clone(), &key.to_path()?, expires_in)
            .await?;
        Ok(url)
    }
}

impl Debug for ObjectStoreDirectory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ObjectStoreDirectory(name={}, provider={}, store={})",
            self.name, self.provider, self.store
        )
    }
}
