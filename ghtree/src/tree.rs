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

//! The root façade over a schema, a node graph, and a point count.
use crate::config::{Config, DuplicatePolicy};
use crate::errors::GhtResult;
use crate::node::{Node, Predicate};
use core_ght::hash::{self, Area, Coordinate};
use geocloud::{Attribute, Schema};
use std::sync::Arc;

/// A hash-prefix tree: an immutable schema, a root node, and the running
/// leaf count. The root's own fragment is always `""`; it exists purely
/// as an anchor so that insertion never has to special-case "no root yet".
#[derive(Debug, Clone)]
pub struct Tree {
    schema: Arc<Schema>,
    root: Node,
    num_points: u64,
    config: Config,
}

impl Tree {
    /// Builds an empty tree over the given schema.
    pub fn new(schema: Schema, config: Config) -> Tree {
        Tree {
            schema: Arc::new(schema),
            root: Node::empty_root(),
            num_points: 0,
            config,
        }
    }

    /// Assembles a tree from its already-validated parts. Used by the
    /// binary reader, which parses a schema and root node directly off
    /// the wire rather than building them through `insert_point`.
    pub(crate) fn from_parts(schema: Schema, config: Config, root: Node, num_points: u64) -> Tree {
        Tree {
            schema: Arc::new(schema),
            root,
            num_points,
            config,
        }
    }

    /// The tree's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The tree's configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// The number of leaves (points) currently in the tree.
    pub fn num_points(&self) -> u64 {
        self.num_points
    }

    /// The tree's root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Encodes `coord` at `resolution` and inserts it as a new leaf
    /// carrying `attributes`, per the tree's duplicate policy.
    pub fn insert_point(&mut self, coord: &Coordinate, resolution: usize, attributes: Vec<Attribute>) -> GhtResult<()> {
        let hash = hash::encode(coord, resolution)?;
        self.insert_hash(&hash, attributes)
    }

    /// Inserts an already-encoded full-resolution hash as a new leaf.
    pub fn insert_hash(&mut self, hash: &str, attributes: Vec<Attribute>) -> GhtResult<()> {
        hash::validate(hash)?;
        self.root.insert(Node::leaf(hash, attributes), self.config.duplicates)?;
        self.num_points += 1;
        Ok(())
    }

    /// Applies attribute compaction to every dimension but the first two
    /// (X and Y, already encoded by the hash).
    pub fn compact(&mut self) {
        for dim in self.schema.dimensions().iter().skip(2) {
            self.root.compact_dim(dim.position);
        }
    }

    /// Produces a new tree containing only the leaves of `self` whose
    /// `dim_position` value satisfies `predicate`.
    pub fn filter(&self, dim_position: u8, predicate: Predicate) -> GhtResult<Tree> {
        if self.num_points == 0 {
            return Ok(Tree {
                schema: Arc::clone(&self.schema),
                root: Node::empty_root(),
                num_points: 0,
                config: self.config,
            });
        }
        let root = match self.root.filter(&self.schema, dim_position, &predicate, &[])? {
            Some(node) => node,
            None => Node::empty_root(),
        };
        let num_points = root.leaf_count() as u64;
        // A real match can collapse all the way down to a bare leaf (path
        // collapse) or a childless node; normalize back to the sentinel
        // shape so the root-fragment invariant keeps holding for further
        // inserts into the filtered tree.
        let root = if root.fragment.is_empty() {
            root
        } else {
            Node {
                fragment: String::new(),
                attributes: Vec::new(),
                children: vec![root],
            }
        };
        Ok(Tree {
            schema: Arc::clone(&self.schema),
            root,
            num_points,
            config: self.config,
        })
    }

    /// The union of the bounding cells of every leaf in the tree.
    /// Fails with `GhtError::Invariant` if the tree has no points.
    pub fn extent(&self) -> GhtResult<Area> {
        if self.num_points == 0 {
            return Err(core_ght::GhtError::Invariant("extent of an empty tree is undefined".into()));
        }
        self.root.extent("")
    }

    /// Depth-first, left-to-right dump of every leaf's full hash and
    /// fully compacted attribute set.
    pub fn to_nodelist(&self) -> Vec<(String, Vec<Attribute>)> {
        if self.num_points == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.root.to_nodelist("", &[], &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use geocloud::{Dimension, Type};

    fn schema() -> Schema {
        Schema::new(vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "Y".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(2, "Z".into(), "".into(), Type::F64, 0.01, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn insert_and_compact_scenario() {
        let s = schema();
        let mut tree = Tree::new(s.clone(), Config::new(DuplicatePolicy::Accept));
        let z = s.dimension_by_index(2).unwrap();
        tree.insert_point(&Coordinate::new(-126.4, 45.3), 10, vec![Attribute::pack(z, 120.5).unwrap()])
            .unwrap();
        tree.insert_point(&Coordinate::new(-126.4, 45.3), 10, vec![Attribute::pack(z, 121.0).unwrap()])
            .unwrap();
        tree.insert_point(&Coordinate::new(-126.41, 45.3), 10, vec![Attribute::pack(z, 120.5).unwrap()])
            .unwrap();
        assert_eq!(tree.num_points(), 3);
        assert_eq!(tree.to_nodelist().len(), 3);
    }

    #[test]
    fn duplicate_policy_scenario() {
        let s = schema();
        let mut tree = Tree::new(s, Config::new(DuplicatePolicy::Reject));
        tree.insert_point(&Coordinate::new(10.0, 10.0), 14, vec![]).unwrap();
        let err = tree.insert_point(&Coordinate::new(10.0, 10.0), 14, vec![]).unwrap_err();
        assert!(matches!(err, core_ght::GhtError::Duplicate));
        assert_eq!(tree.num_points(), 1);
        assert_eq!(tree.to_nodelist().len(), 1);
    }

    #[test]
    fn filter_equal_scenario() {
        let s = schema();
        let mut tree = Tree::new(s.clone(), Config::new(DuplicatePolicy::Accept));
        let z = s.dimension_by_index(2).unwrap();
        let zs = [100.0, 100.0, 120.0, 100.0, 130.0];
        for (i, z_val) in zs.iter().enumerate() {
            let coord = Coordinate::new(-120.0 + i as f64 * 0.001, 40.0 + i as f64 * 0.001);
            tree.insert_point(&coord, 12, vec![Attribute::pack(z, *z_val).unwrap()]).unwrap();
        }
        let filtered = tree.filter(2, Predicate::Eq(100.0)).unwrap();
        assert_eq!(filtered.num_points(), 3);
        for (_, attrs) in filtered.to_nodelist() {
            let attr = geocloud::attribute::find(&attrs, 2).unwrap();
            assert_eq!(attr.unpack(z), 100.0);
        }
    }
}
