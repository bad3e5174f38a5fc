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
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Storage provider type
///
/// Two adapters may copy blobs between each other natively only when their
/// connections report the same `StorageType`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Local filesystem storage
    Local,
    /// AWS S3 storage
    Aws,
    /// Azure Blob Storage
    Azure,
    /// Google Cloud Storage
    Gcs,
    /// In-process memory storage
    Memory,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Local => "local",
            StorageType::Aws => "aws",
            StorageType::Azure => "azure",
            StorageType::Gcs => "gcs",
            StorageType::Memory => "memory",
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageType::Local),
            "aws" | "s3" => Ok(StorageType::Aws),
            "azure" => Ok(StorageType::Azure),
            "gcs" | "gcp" => Ok(StorageType::Gcs),
            "memory" => Ok(StorageType::Memory),
            _ => Err(StorageError::ConfigError(format!(
                "Unknown storage type: {}",
                s
            ))),
        }
    }
}

/// Connection options for a storage provider
///
/// The options map is passed to the object_store builders when a connection
/// opens a directory. The directory itself (bucket, container or local
/// sub-directory) is not part of the connection options, it is named by the
/// adapter.
///
/// # Examples
///
/// ## Local filesystem
/// ```
/// use blob_courier::storage::StorageConfig;
///
/// let config = StorageConfig::local()
///     .with_option("path", "/tmp/blobs");
/// ```
///
/// ## AWS S3
/// ```
/// use blob_courier::storage::StorageConfig;
///
/// let config = StorageConfig::new("s3")
///     .with_option("region", "us-east-1")
///     .with_option("access_key_id", "ACCESS_KEY")
///     .with_option("secret_access_key", "SECRET_ACCESS_KEY");
/// ```
///
/// ## Azure
/// ```
/// use blob_courier::storage::StorageConfig;
///
/// let config = StorageConfig::new("azure")
///     .with_option("account_name", "myaccount")
///     .with_option("access_key", "ACCOUNT_KEY");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider type
    #[serde(rename = "type")]
    pub storage_type: StorageType,

    /// Provider-specific configuration options
    ///
    /// AWS S3:
    /// - region: AWS region (e.g., "us-east-1")
    /// - access_key_id: AWS access key ID
    /// - secret_access_key: AWS secret access key
    /// - session_token: AWS session token (for temporary credentials)
    /// - endpoint: Custom endpoint URL (for S3-compatible services)
    /// - allow_http: "true" to allow HTTP connections
    ///
    /// Azure:
    /// - account_name: Storage account name
    /// - access_key: Account key
    /// - sas_token: SAS token
    /// - tenant_id, client_id, client_secret: Azure AD credentials
    ///
    /// GCS:
    /// - service_account_key_path: Path to service account JSON key file
    /// - service_account_key: Service account key as JSON string
    ///
    /// Local:
    /// - path: Root directory; each storage directory is a sub-directory of it
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl StorageConfig {
    /// Create a new storage configuration.
    ///
    /// # Arguments
    ///
    /// * `storage_type` - The type of storage provider ("local", "aws", "azure", "gcs", "memory")
    ///
    /// # Panics
    ///
    /// Panics if the storage type is unknown. Use [`StorageType::from_str`]
    /// and [`StorageConfig::for_type`] to handle untrusted input.
    pub fn new(storage_type: impl Into<String>) -> Self {
        let storage_type_str = storage_type.into();
        match storage_type_str.parse::<StorageType>() {
            Ok(storage_type) => Self::for_type(storage_type),
            Err(_) => panic!("Unknown storage type: {}", storage_type_str),
        }
    }

    /// Create a configuration for an already parsed storage type.
    pub fn for_type(storage_type: StorageType) -> Self {
        let options = match storage_type {
            StorageType::Aws | StorageType::Azure | StorageType::Gcs => Self::default_options(),
            StorageType::Local | StorageType::Memory => HashMap::new(),
        };
        Self {
            storage_type,
            options,
        }
    }

    /// Create a local filesystem storage configuration.
    pub fn local() -> Self {
        Self::for_type(StorageType::Local)
    }

    /// Create an AWS S3 storage configuration.
    pub fn aws() -> Self {
        Self::for_type(StorageType::Aws)
    }

    /// Create an Azure storage configuration.
    pub fn azure() -> Self {
        Self::for_type(StorageType::Azure)
    }

    /// Create a GCS storage configuration.
    pub fn gcs() -> Self {
        Self::for_type(StorageType::Gcs)
    }

    /// Create an in-memory storage configuration.
    pub fn memory() -> Self {
        Self::for_type(StorageType::Memory)
    }

    /// Get default HTTP client options for the cloud storage types.
    ///
    /// # Returns
    ///
    /// A HashMap containing default timeout and connection pool settings.
    pub fn default_options() -> HashMap<String, String> {
        [
            ("timeout", "1200"),
            ("connect_timeout", "30"),
            ("pool_idle_timeout", "15"),
            ("pool_max_idle_per_host", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Add a configuration option.
    ///
    /// # Returns
    ///
    /// The `StorageConfig` instance with the added option (for method chaining).
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add multiple configuration options.
    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    /// Get a configuration option.
    ///
    /// # Returns
    ///
    /// `Some(&String)` if the option exists, `None` otherwise.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    /// Get the storage type as a string.
    pub fn storage_type_str(&self) -> &str {
        self.storage_type.as_str()
    }
}

impl From<StorageConfig> for String {
    fn from(config: StorageConfig) -> Self {
        config.storage_type_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_serialization() {
        assert_eq!(
            serde_json::to_string(&StorageType::Local).unwrap(),
            "\"local\""
        );
        assert_eq!(serde_json::to_string(&StorageType::Aws).unwrap(), "\"aws\"");
        assert_eq!(
            serde_json::to_string(&StorageType::Azure).unwrap(),
            "\"azure\""
        );
        assert_eq!(serde_json::to_string(&StorageType::Gcs).unwrap(), "\"gcs\"");
        assert_eq!(
            serde_json::to_string(&StorageType::Memory).unwrap(),
            "\"memory\""
        );
    }

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!("s3".parse::<StorageType>().unwrap(), StorageType::Aws);
        assert_eq!("AWS".parse::<StorageType>().unwrap(), StorageType::Aws);
        assert_eq!("gcp".parse::<StorageType>().unwrap(), StorageType::Gcs);
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);

        match "ftp".parse::<StorageType>() {
            Err(StorageError::ConfigError(msg)) => assert!(msg.contains("ftp")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_type_display() {
        assert_eq!(StorageType::Azure.to_string(), "azure");
        assert_eq!(StorageType::Memory.to_string(), "memory");
    }

    #[test]
    fn test_storage_config_new_aws() {
        let config1 = StorageConfig::new("aws");
        let config2 = StorageConfig::new("s3");

        assert_eq!(config1.storage_type, StorageType::Aws);
        assert_eq!(config2.storage_type, StorageType::Aws);
        assert_eq!(config1.storage_type_str(), "aws");
    }

    #[test]
    #[should_panic(expected = "Unknown storage type")]
    fn test_storage_config_new_invalid() {
        StorageConfig::new("invalid");
    }

    #[test]
    fn test_cloud_configs_carry_client_defaults() {
        for config in [
            StorageConfig::aws(),
            StorageConfig::azure(),
            StorageConfig::gcs(),
        ] {
            assert_eq!(config.get_option("timeout"), Some(&"1200".to_string()));
        }
        assert!(StorageConfig::local().options.is_empty());
        assert!(StorageConfig::memory().options.is_empty());
    }

    #[test]
    fn test_default_options_do_not_enable_retries() {
        let options = StorageConfig::default_options();
        assert!(!options.contains_key("max_retries"));
        assert!(!options.contains_key("retry_timeout"));
        assert_eq!(options.get("connect_timeout"), Some(&"30".to_string()));
    }

    #[test]
    fn test_with_options_keeps_defaults() {
        let mut custom_options = HashMap::new();
        custom_options.insert("region".to_string(), "us-east-1".to_string());

        let config = StorageConfig::aws()
            .with_options(custom_options)
            .with_option("timeout", "60");

        assert_eq!(config.get_option("region"), Some(&"us-east-1".to_string()));
        assert_eq!(config.get_option("timeout"), Some(&"60".to_string()));
        assert_eq!(config.get_option("nonexistent"), None);
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{"type":"memory"}"#;
        let config: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage_type, StorageType::Memory);
        assert!(config.options.is_empty());

        let json = r#"{"type":"aws","options":{"region":"eu-west-1"}}"#;
        let config: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.get_option("region"), Some(&"eu-west-1".to_string()));
    }

    #[test]
    fn test_from_storage_config_to_string() {
        let local_str: String = StorageConfig::local().into();
        let gcs_str: String = StorageConfig::gcs().into();
        assert_eq!(local_str, "local");
        assert_eq!(gcs_str, "gcs");
    }
}
