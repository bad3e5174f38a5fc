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


use crate::storage::provider::BlobKey;

/// Maps caller identifiers to keys inside the adapter's directory.
///
/// With a prefix, `id` resolves to `<prefix>/<id>`; without one (or with an
/// empty one) it resolves to `id` unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyResolver {
    prefix: Option<String>,
}

impl KeyResolver {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn resolve(&self, id: &str) -> BlobKey {
        match &self.prefix {
            Some(prefix) => BlobKey::new(format!("{}/{}", prefix, id)),
            None => BlobKey::new(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_prefix() {
        let keys = KeyResolver::new(Some("pre".to_string()));
        assert_eq!(keys.resolve("bar").as_str(), "pre/bar");
        assert_eq!(keys.prefix(), Some("pre"));
    }

    #[test]
    fn test_resolve_without_prefix() {
        let keys = KeyResolver::new(None);
        assert_eq!(keys.resolve("bar").as_str(), "bar");
        assert_eq!(keys.prefix(), None);
    }

    #[test]
    fn test_empty_prefix_is_no_prefix() {
        let keys = KeyResolver::new(Some(String::new()));
        assert_eq!(keys.resolve("bar").as_str(), "bar");
        assert_eq!(keys, KeyResolver::default());
    }

    #[test]
    fn test_nested_prefix_and_id() {
        let keys = KeyResolver::new(Some("cache/2024".to_string()));
        assert_eq!(
            keys.resolve("photos/a.jpg").as_str(),
            "cache/2024/photos/a.jpg"
        );
    }

    #[test]
    fn test_resolution_is_deterministic_and_distinct() {
        let keys = KeyResolver::new(Some("pre".to_string()));
        assert_eq!(keys.resolve("foo"), keys.resolve("foo"));
        assert_ne!(keys.resolve("foo"), keys.resolve("bar"));
        assert_ne!(keys.resolve("a/b"), keys.resolve("a_b"));
    }
}
