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


//! # Blob Courier
//!
//! A uniform blob-storage adapter for file-attachment layers, built on top of
//! the `object_store` crate.
//!
//! Blob Courier lets an upload pipeline treat AWS S3, Azure Blob Storage,
//! Google Cloud Storage, the local filesystem and an in-memory store
//! interchangeably through one contract: upload, download, open, read,
//! exists, delete, url and clear.
//!
//! ## Features
//!
//! - **Key namespacing**: every key of an adapter lives under an optional prefix
//! - **Native copies**: uploads from another adapter of the same provider are copied by the backend
//! - **Public or signed URLs**: derived from one signing primitive
//! - **Contract linting**: [`lint::Linter`] checks a live storage end to end
//!
//! ## Quick Start
//!
//! ### AWS S3 Example
//!
//! ```rust,no_run
//! use blob_courier::{BlobStorage, StorageConfig, UploadOptions, UrlOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = StorageConfig::aws()
//!     .with_option("region", "us-east-1")
//!     .with_option("access_key_id", "ACCESS_KEY")
//!     .with_option("secret_access_key", "SECRET_KEY");
//!
//! let storage = BlobStorage::builder("my-bucket")
//!     .with_prefix("store")
//!     .with_public(false)
//!     .with_config(config)
//!     .build()
//!     .await?;
//!
//! storage.upload("hello", "greeting.txt", None, UploadOptions::new()).await?;
//! let url = storage.url("greeting.txt", &UrlOptions::default()).await?;
//! println!("{}", url);
//! # Ok(())
//! # }
//! ```
//!
//! ### Local Filesystem Example
//!
//! ```rust,no_run
//! use blob_courier::{BlobStorage, StorageConfig, UploadOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! // Blobs are stored below ./data/uploads, which must exist
//! let config = StorageConfig::local().with_option("path", "./data");
//!
//! let storage = BlobStorage::builder("uploads").with_config(config).build().await?;
//! storage.upload(vec![1u8, 2, 3], "raw.bin", None, UploadOptions::new()).await?;
//! assert!(storage.exists("raw.bin").await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`adapter`] - The storage contract over one directory
//! - [`storage`] - Backend connections, directories and URL fetching
//! - [`lint`] - Contract checks against a live storage

pub mod adapter;
pub mod lint;
pub mod storage;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use adapter::{BlobStorage, BlobStorageBuilder, BlobStorageOptions, Content, UploadOptions};
pub use storage::{StorageConfig, StorageError, StorageResult, StorageType, UrlOptions};
