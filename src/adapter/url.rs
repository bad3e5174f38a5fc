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


use url::Url;

use super::BlobStorage;
use crate::storage::error::StorageResult;
use crate::storage::provider::UrlOptions;

impl BlobStorage {
    /// URL of the blob stored under `id`.
    ///
    /// The backend signs a URL valid for the configured expiry. A private
    /// storage returns it unchanged. A public storage returns it without its
    /// query, so the signature and expiry are gone.
    ///
    /// Public mode requires that blobs are readable without a signature, for
    /// example through a bucket policy or a public CDN origin. This is not
    /// checked; an unsigned URL to a private blob is rejected by the provider
    /// on use.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unsupported`](crate::storage::error::StorageError::Unsupported)
    /// if the backend cannot sign URLs.
    pub async fn url(&self, id: &str, options: &UrlOptions) -> StorageResult<String> {
        Ok(self.resolve_url(id, options).await?.to_string())
    }

    pub(crate) async fn resolve_url(&self, id: &str, options: &UrlOptions) -> StorageResult<Url> {
        let mut url = self
            .directory
            .sign(&self.key(id), self.expires, options)
            .await?;
        if self.public {
            url.set_query(None);
        }
        Ok(url)
    }
}
