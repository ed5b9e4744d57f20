/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

//! Tree-wide configuration.
use crate::errors::{GhtError, GhtResult};
use yaml_rust::YamlLoader;

/// What to do when an insert finds an existing leaf at the same full-resolution hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the insert with `GhtError::Duplicate`.
    Reject,
    /// Merge the new leaf's attributes into the existing one, first-write-wins.
    Accept,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Reject
    }
}

/// Tree-wide configuration. Currently carries only the duplicate policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// How to handle an insert that collides with an existing leaf.
    pub duplicates: DuplicatePolicy,
}

impl Config {
    /// Builds a config with the given duplicate policy.
    pub fn new(duplicates: DuplicatePolicy) -> Config {
        Config { duplicates }
    }

    /// Parses a single `duplicates: reject|accept` key from a YAML document,
    /// defaulting to `Reject` when the document or key is absent.
    pub fn from_yaml_str(yaml: &str) -> GhtResult<Config> {
        let docs = YamlLoader::load_from_str(yaml)
            .map_err(|e| GhtError::Format(format!("invalid config yaml: {}", e)))?;
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(Config::default()),
        };
        let duplicates = match doc["duplicates"].as_str() {
            None => DuplicatePolicy::Reject,
            Some("reject") => DuplicatePolicy::Reject,
            Some("accept") => DuplicatePolicy::Accept,
            Some(other) => {
                return Err(GhtError::Format(format!("unknown duplicates policy {:?}", other)))
            }
        };
        Ok(Config { duplicates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_reject() {
        assert_eq!(Config::default().duplicates, DuplicatePolicy::Reject);
    }

    #[test]
    fn parses_accept() {
        let cfg = Config::from_yaml_str("duplicates: accept").unwrap();
        assert_eq!(cfg.duplicates, DuplicatePolicy::Accept);
    }

    #[test]
    fn empty_document_defaults() {
        let cfg = Config::from_yaml_str("").unwrap();
        assert_eq!(cfg.duplicates, DuplicatePolicy::Reject);
    }

    #[test]
    fn unknown_policy_is_format_error() {
        assert!(Config::from_yaml_str("duplicates: maybe").is_err());
    }
}
