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


//! Object storage backend layer
//!
//! This module provides the narrow interface the adapter is written against
//! ([`Connection`] and [`Directory`]) and its implementation over the
//! `object_store` crate for AWS S3, Azure Blob Storage, GCS, the local
//! filesystem and an in-process memory store.

pub mod config;
pub mod error;
pub mod factory;
pub mod fetch;
pub mod object_store;
pub mod provider;

// Public exports
pub use config::{StorageConfig, StorageType};
pub use error::{StorageError, StorageResult};
pub use factory::ConnectionFactory;
pub use fetch::{DownloadedFile, Fetcher, HttpFetcher, RemoteFile};
pub use provider::{BlobKey, BlobMetadata, Connection, Directory, UrlOptions};
