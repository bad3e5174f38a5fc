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


use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend reported that no blob exists under `key`.
    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[source] object_store::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

impl StorageError {
    /// Whether this error is the backend's not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl From<object_store::Error> for StorageError {
    fn from(error: object_store::Error) -> Self {
        match error {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound { key: path },
            other => StorageError::ObjectStoreError(other),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error() {
        let error = StorageError::ConfigError("Invalid configuration".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_not_found_error() {
        let error = StorageError::NotFound {
            key: "pre/missing".to_string(),
        };
        assert_eq!(error.to_string(), "Blob not found: pre/missing");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_object_store_not_found_conversion() {
        let source = object_store::Error::NotFound {
            path: "pre/bar".to_string(),
            source: "no such key".into(),
        };
        let storage_error: StorageError = source.into();

        match storage_error {
            StorageError::NotFound { key } => assert_eq!(key, "pre/bar"),
            other => panic!("Expected NotFound variant, got {:?}", other),
        }
    }

    #[test]
    fn test_object_store_other_errors_are_wrapped() {
        let source = object_store::Error::Generic {
            store: "S3",
            source: "access denied".into(),
        };
        let storage_error: StorageError = source.into();

        assert!(!storage_error.is_not_found());
        match storage_error {
            StorageError::ObjectStoreError(_) => {
                assert!(storage_error.to_string().contains("access denied"));
            }
            _ => panic!("Expected ObjectStoreError variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let storage_error: StorageError = io_error.into();

        // An IO not-found is not the backend's blob-absence signal
        assert!(!storage_error.is_not_found());
        match storage_error {
            StorageError::IoError(_) => {
                assert!(storage_error.to_string().contains("IO error"));
            }
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let url_error = url::ParseError::EmptyHost;
        let storage_error: StorageError = url_error.into();

        match storage_error {
            StorageError::UrlParseError(_) => {
                assert!(storage_error.to_string().contains("URL parse error"));
            }
            _ => panic!("Expected UrlParseError variant"),
        }
    }

    #[test]
    fn test_unsupported_error() {
        let error = StorageError::Unsupported("signed URLs for local storage".to_string());
        assert_eq!(
            error.to_string(),
            "Unsupported operation: signed URLs for local storage"
        );
    }

    #[test]
    fn test_storage_result_err() {
        let result: StorageResult<i32> = Err(StorageError::InvalidKey("a//b".to_string()));
        assert!(result.is_err());
    }
}
