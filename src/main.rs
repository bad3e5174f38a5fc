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
use std::env;
use std::error::Error;

use serde_json::json;
use tracing::info;

use blob_courier::lint::Linter;
use blob_courier::storage::{StorageConfig, StorageError, StorageType};
use blob_courier::BlobStorage;

const OPTION_PREFIX: &str = "STORAGE_OPTION_";
const DEFAULT_PREFIX: &str = "blob-courier-lint";

fn required_var(name: &str) -> Result<String, StorageError> {
    env::var(name).map_err(|_| StorageError::ConfigError(format!("{} must be set", name)))
}

/// `STORAGE_OPTION_ACCESS_KEY_ID=..` becomes option `access_key_id`.
fn options_from_env() -> HashMap<String, String> {
    env::vars()
        .filter_map(|(name, value)| {
            name.strip_prefix(OPTION_PREFIX)
                .filter(|option| !option.is_empty())
                .map(|option| (option.to_lowercase(), value))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let storage_type: StorageType = required_var("STORAGE_TYPE")?.parse()?;
    let directory = required_var("STORAGE_DIRECTORY")?;
    let prefix = env::var("STORAGE_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
    let public = match env::var("STORAGE_PUBLIC") {
        Ok(value) => value.parse::<bool>().map_err(|_| {
            StorageError::ConfigError(format!("STORAGE_PUBLIC must be true or false, got '{}'", value))
        })?,
        Err(_) => true,
    };

    info!(
        "Starting blob-courier lint, type={}, directory={}, prefix={}",
        storage_type, directory, prefix
    );

    let config = StorageConfig::for_type(storage_type).with_options(options_from_env());
    let mut builder = BlobStorage::builder(directory)
        .with_public(public)
        .with_config(config);
    if !prefix.is_empty() {
        builder = builder.with_prefix(prefix);
    }
    let storage = builder.build().await?;

    let mut linter = Linter::new(&storage);
    if matches!(storage_type, StorageType::Local | StorageType::Memory) {
        linter = linter.skip_urls();
    }
    let passed = linter.run().await?;

    let summary = json!({
        "provider": storage.provider().as_str(),
        "directory": storage.directory().name(),
        "prefix": storage.prefix(),
        "public": storage.is_public(),
        "checks": passed,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
