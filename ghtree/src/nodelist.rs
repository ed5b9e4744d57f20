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

//! A growable ordered sequence of node references, used for bulk build and
//! as the output of a full tree dump.
use crate::config::Config;
use crate::errors::GhtResult;
use crate::node::Node;
use crate::tree::Tree;
use geocloud::{Attribute, Schema};

/// An ordered sequence of `(full_hash, attributes)` pairs, as produced by
/// [`crate::tree::Tree::to_nodelist`].
#[derive(Debug, Clone, Default)]
pub struct NodeList {
    entries: Vec<(String, Vec<Attribute>)>,
}

impl NodeList {
    /// An empty node list.
    pub fn new() -> NodeList {
        NodeList { entries: Vec::new() }
    }

    /// Appends a full hash and its attribute set.
    pub fn push(&mut self, full_hash: String, attributes: Vec<Attribute>) {
        self.entries.push((full_hash, attributes));
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, in order.
    pub fn entries(&self) -> &[(String, Vec<Attribute>)] {
        &self.entries
    }
}

impl From<Vec<(String, Vec<Attribute>)>> for NodeList {
    fn from(entries: Vec<(String, Vec<Attribute>)>) -> Self {
        NodeList { entries }
    }
}

/// Builds a fresh tree with an empty root and inserts every entry of
/// `list` under the given schema and duplicate policy. Used to rebuild a
/// tree from the flat dump produced by `Tree::to_nodelist`.
pub fn tree_from_nodelist(schema: Schema, config: Config, list: &NodeList) -> GhtResult<Tree> {
    let mut tree = Tree::new(schema, config);
    for (hash, attrs) in list.entries() {
        tree.insert_hash(hash, attrs.clone())?;
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use core_ght::hash::Coordinate;
    use geocloud::{Dimension, Type};

    fn schema() -> Schema {
        Schema::new(vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "Y".into(), "".into(), Type::F64, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn round_trips_through_nodelist() {
        let s = schema();
        let mut tree = Tree::new(s.clone(), Config::new(DuplicatePolicy::Reject));
        for i in 0..20 {
            let coord = Coordinate::new(-120.0 + i as f64 * 0.01, 40.0 + i as f64 * 0.01);
            tree.insert_point(&coord, 12, vec![]).unwrap();
        }
        let list: NodeList = tree.to_nodelist().into();
        let rebuilt = tree_from_nodelist(s, Config::new(DuplicatePolicy::Reject), &list).unwrap();
        assert_eq!(rebuilt.to_nodelist(), tree.to_nodelist());
    }
}
