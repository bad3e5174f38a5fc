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


use std::sync::Arc;

use super::config::StorageConfig;
use super::error::StorageResult;
use super::object_store::ObjectStoreConnection;
use super::provider::Connection;

/// Factory for creating storage connections
pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Create a connection from a configuration.
    ///
    /// The connection works with any object_store backend (AWS S3, Azure,
    /// GCS, local filesystem or in-memory). Stores are built when a directory
    /// is resolved, so option errors surface from
    /// [`Connection::directory`].
    ///
    /// # Arguments
    ///
    /// * `config` - The storage configuration specifying the provider type and options
    ///
    /// # Returns
    ///
    /// A `Result` containing:
    /// * `Ok(Arc<dyn Connection>)` - A thread-safe reference to the connection
    /// * `Err(StorageError)` - If the connection cannot be created
    pub async fn from_config(config: StorageConfig) -> StorageResult<Arc<dyn Connection>> {
        let connection: Arc<dyn Connection> = Arc::new(ObjectStoreConnection::new(config));
        Ok(connection)
    }
}
