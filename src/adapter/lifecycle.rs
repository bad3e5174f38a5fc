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


use tracing::{debug, info};

use super::BlobStorage;
use crate::storage::error::StorageResult;

impl BlobStorage {
    /// Whether a blob is stored under `id`.
    ///
    /// # Errors
    ///
    /// A missing blob is `Ok(false)`. Any other backend failure propagates.
    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        match self.directory.head(&self.key(id)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete the blob stored under `id`. Deleting a missing blob succeeds.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        let key = self.key(id);
        match self.directory.destroy(&key).await {
            Err(e) if e.is_not_found() => {
                debug!("Delete of missing key={} ignored", key);
                Ok(())
            }
            result => result,
        }
    }

    /// Delete every blob under this storage's prefix, or every blob of the
    /// directory when there is no prefix. The prefix matches whole path
    /// segments: prefix `pre` covers `pre/a` but not `prefix/a`.
    ///
    /// Blobs are destroyed one at a time in listing order. The first failure
    /// is returned; blobs deleted before it stay deleted and the rest are left
    /// in place.
    pub async fn clear(&self) -> StorageResult<()> {
        let blobs = self.directory.list(self.keys.prefix()).await?;
        let total = blobs.len();

        for (deleted, blob) in blobs.iter().enumerate() {
            if let Err(e) = self.directory.destroy(&blob.key).await {
                info!(
                    "Clear of directory={} stopped at key={}, deleted={} of total={}",
                    self.directory.name(),
                    blob.key,
                    deleted,
                    total
                );
                return Err(e);
            }
        }

        info!(
            "Cleared directory={}, prefix={:?}, deleted={}",
            self.directory.name(),
            self.keys.prefix(),
            total
        );
        Ok(())
    }
}
