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

//! A node in the hash-prefix tree: a fragment of a geohash, a child list,
//! and the attributes that apply to every leaf beneath it.
use crate::config::DuplicatePolicy;
use crate::errors::{GhtError, GhtResult};
use core_ght::hash::{self, hash_match, Area, MatchClass, MAX_HASH_LEN};
use geocloud::{attribute, Attribute, Schema};

/// A node of the tree. Owns its fragment, its children, and its attribute chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The portion of the full hash stored at this node.
    pub fragment: String,
    /// Child nodes, disambiguated by the first character of their fragment.
    pub children: Vec<Node>,
    /// Attributes attached directly to this node.
    pub attributes: Vec<Attribute>,
}

/// A predicate evaluated against a single dimension's scaled value during a filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// `|x - v| < 1e-7`.
    Eq(f64),
    /// `v1 <= x <= v2`.
    Between(f64, f64),
    /// `x < v`.
    Lt(f64),
    /// `x > v`.
    Gt(f64),
}

/// The equality tolerance used by [`Predicate::Eq`].
pub const FILTER_EPSILON: f64 = 1e-7;

impl Predicate {
    fn matches(&self, x: f64) -> bool {
        match *self {
            Predicate::Eq(v) => (x - v).abs() < FILTER_EPSILON,
            Predicate::Between(lo, hi) => x >= lo && x <= hi,
            Predicate::Lt(v) => x < v,
            Predicate::Gt(v) => x > v,
        }
    }
}

impl Node {
    /// Builds a leaf node with no children.
    pub fn leaf(fragment: impl Into<String>, attributes: Vec<Attribute>) -> Node {
        Node {
            fragment: fragment.into(),
            children: Vec::new(),
            attributes,
        }
    }

    /// Builds the empty root of a fresh tree.
    pub fn empty_root() -> Node {
        Node::leaf("", Vec::new())
    }

    /// True if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Merges `new_node` into the subtree rooted at `self`, per the
    /// match-class table: `Same` merges attributes (or fails on a
    /// duplicate), `Global`/`Child` recurse into the matching child (or
    /// append one), and `Split` inserts a synthetic intermediate node that
    /// factors out the newly discovered common prefix.
    pub fn insert(&mut self, mut new_node: Node, dup_policy: DuplicatePolicy) -> GhtResult<()> {
        let (class, a_tail, b_tail) = hash_match(&self.fragment, &new_node.fragment, MAX_HASH_LEN);
        let a_tail = a_tail.to_string();
        let b_tail = b_tail.to_string();

        match class {
            MatchClass::Same => {
                if dup_policy == DuplicatePolicy::Reject {
                    return Err(GhtError::Duplicate);
                }
                self.attributes = attribute::union(&self.attributes, &new_node.attributes);
                Ok(())
            }
            MatchClass::Global => self.attach_child(new_node, dup_policy),
            MatchClass::Child => {
                if !a_tail.is_empty() {
                    // new_node's fragment is a proper prefix of self's: this library only
                    // ever inserts full-resolution leaf hashes or reconstructs from a
                    // nodelist of full hashes, so every insertion path keeps fragments at
                    // a fixed total length and this shape cannot arise.
                    return Err(GhtError::Invariant(
                        "insert: existing fragment is longer than the inserted one".into(),
                    ));
                }
                new_node.fragment = b_tail;
                self.attach_child(new_node, dup_policy)
            }
            MatchClass::Split => {
                let intermediate = Node {
                    fragment: a_tail,
                    children: std::mem::take(&mut self.children),
                    attributes: std::mem::take(&mut self.attributes),
                };
                let k = self.fragment.len() - intermediate.fragment.len();
                self.fragment.truncate(k);
                new_node.fragment = b_tail;
                self.children = vec![intermediate, new_node];
                Ok(())
            }
            MatchClass::None => Err(GhtError::Invariant(
                "insert: top-level hash match produced None; root fragment must be empty".into(),
            )),
        }
    }

    fn attach_child(&mut self, new_node: Node, dup_policy: DuplicatePolicy) -> GhtResult<()> {
        let first = new_node.fragment.as_bytes().first().copied();
        if let Some(first) = first {
            if let Some(existing) = self
                .children
                .iter_mut()
                .find(|c| c.fragment.as_bytes().first().copied() == Some(first))
            {
                return existing.insert(new_node, dup_policy);
            }
        }
        self.children.push(new_node);
        Ok(())
    }

    /// Lifts `dim_position`'s value to the lowest node whose every
    /// descendant leaf carries it with a bit-identical packed value,
    /// removing it from the descendants it was lifted from. Returns the
    /// value now in force at `self`, if any.
    pub fn compact_dim(&mut self, dim_position: u8) -> Option<Attribute> {
        if self.is_leaf() {
            return attribute::find(&self.attributes, dim_position).copied();
        }

        let child_values: Vec<Option<Attribute>> =
            self.children.iter_mut().map(|c| c.compact_dim(dim_position)).collect();

        let uniform = match child_values.split_first() {
            Some((Some(first), rest)) => {
                let all_match = rest.iter().all(|v| matches!(v, Some(a) if a.packed_bytes() == first.packed_bytes()));
                if all_match {
                    Some(*first)
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some(attr) = uniform {
            for child in &mut self.children {
                child.attributes.retain(|a| a.dim_position != dim_position);
            }
            self.attributes.retain(|a| a.dim_position != dim_position);
            self.attributes.push(attr);
        }
        uniform
    }

    /// Produces a filtered clone of the subtree rooted at `self`: leaves
    /// not satisfying `predicate` are dropped, and internal nodes left
    /// with exactly one surviving child have their fragment merged with
    /// it (path collapse).
    pub fn filter(
        &self,
        schema: &Schema,
        dim_position: u8,
        predicate: &Predicate,
        parent_attrs: &[Attribute],
    ) -> GhtResult<Option<Node>> {
        let inherited = attribute::union(&self.attributes, parent_attrs);

        if self.is_leaf() {
            let dim = schema.dimension_by_index(dim_position as usize)?;
            return Ok(match attribute::find(&inherited, dim_position) {
                Some(attr) if predicate.matches(attr.unpack(dim)) => {
                    Some(Node::leaf(self.fragment.clone(), self.attributes.clone()))
                }
                _ => None,
            });
        }

        let mut surviving = Vec::with_capacity(self.children.len());
        for child in &self.children {
            if let Some(kept) = child.filter(schema, dim_position, predicate, &inherited)? {
                surviving.push(kept);
            }
        }

        Ok(match surviving.len() {
            0 => None,
            1 => {
                let mut only = surviving.pop().unwrap();
                only.fragment = format!("{}{}", self.fragment, only.fragment);
                // `self` is being folded into `only`: any attribute compaction lifted
                // onto `self` would otherwise vanish, since nothing above this call
                // still has a node to inherit it from. The child's own values win any
                // conflict, matching the own-beats-inherited convention `to_nodelist`
                // and `compact_dim` already use elsewhere.
                only.attributes = attribute::union(&only.attributes, &self.attributes);
                Some(only)
            }
            _ => Some(Node {
                fragment: self.fragment.clone(),
                children: surviving,
                attributes: self.attributes.clone(),
            }),
        })
    }

    /// The union of the bounding cells of every leaf beneath `self`.
    pub fn extent(&self, inherited_hash: &str) -> GhtResult<Area> {
        let full = format!("{}{}", inherited_hash, self.fragment);
        if self.is_leaf() {
            return hash::decode_area(&full);
        }
        let mut acc: Option<Area> = None;
        for child in &self.children {
            let area = child.extent(&full)?;
            acc = Some(match acc {
                None => area,
                Some(a) => union_area(a, area),
            });
        }
        acc.ok_or_else(|| GhtError::Invariant("internal node has no children".into()))
    }

    /// Depth-first, left-to-right dump of every leaf's full hash and
    /// fully inherited attribute set.
    pub fn to_nodelist(&self, inherited_hash: &str, inherited_attrs: &[Attribute], out: &mut Vec<(String, Vec<Attribute>)>) {
        let full = format!("{}{}", inherited_hash, self.fragment);
        let all_attrs = attribute::union(&self.attributes, inherited_attrs);
        if self.is_leaf() {
            out.push((full, all_attrs));
        } else {
            for child in &self.children {
                child.to_nodelist(&full, &all_attrs, out);
            }
        }
    }

    /// Number of leaves beneath `self`, inclusive.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Node::leaf_count).sum()
        }
    }
}

fn union_area(a: Area, b: Area) -> Area {
    Area {
        x_min: a.x_min.min(b.x_min),
        y_min: a.y_min.min(b.y_min),
        x_max: a.x_max.max(b.x_max),
        y_max: a.y_max.max(b.y_max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocloud::{Dimension, Type};

    fn schema() -> Schema {
        Schema::new(vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "Y".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(2, "Z".into(), "".into(), Type::F64, 0.01, 0.0),
        ])
        .unwrap()
    }

    fn z_attr(schema: &Schema, value: f64) -> Attribute {
        Attribute::pack(schema.dimension_by_index(2).unwrap(), value).unwrap()
    }

    fn tag_schema() -> Schema {
        Schema::new(vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "Y".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(2, "Z".into(), "".into(), Type::F64, 0.01, 0.0),
            Dimension::new(3, "Tag".into(), "".into(), Type::U8, 1.0, 0.0),
        ])
        .unwrap()
    }

    fn tag_attr(schema: &Schema, value: f64) -> Attribute {
        Attribute::pack(schema.dimension_by_index(3).unwrap(), value).unwrap()
    }

    #[test]
    fn split_creates_two_children() {
        // The tree root's own fragment stays "" (the global sentinel; see
        // the None-is-impossible note on `insert`'s match on the root).
        // The first insert attaches directly as a child; the second causes
        // a Split within that child, which inherits the real structure.
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![]), DuplicatePolicy::Reject).unwrap();
        root.insert(Node::leaf("abcfg", vec![]), DuplicatePolicy::Reject).unwrap();
        assert_eq!(root.fragment, "");
        assert_eq!(root.children.len(), 1);
        let branch = &root.children[0];
        assert_eq!(branch.fragment, "abc");
        assert_eq!(branch.children.len(), 2);
        assert_eq!(root.leaf_count(), 2);
    }

    #[test]
    fn duplicate_reject_fails_second_insert() {
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![]), DuplicatePolicy::Reject).unwrap();
        let err = root.insert(Node::leaf("abcde", vec![]), DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, GhtError::Duplicate));
        assert_eq!(root.leaf_count(), 1);
    }

    #[test]
    fn duplicate_accept_unions_attributes() {
        let s = schema();
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 1.0)]), DuplicatePolicy::Accept)
            .unwrap();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 2.0)]), DuplicatePolicy::Accept)
            .unwrap();
        assert_eq!(root.leaf_count(), 1);
        let leaf = &root.children[0];
        assert_eq!(attribute::find(&leaf.attributes, 2).unwrap().unpack(s.dimension_by_index(2).unwrap()), 1.0);
    }

    #[test]
    fn compact_lifts_uniform_value_and_clears_leaves() {
        let s = schema();
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 42.0)]), DuplicatePolicy::Accept)
            .unwrap();
        root.insert(Node::leaf("abcfg", vec![z_attr(&s, 42.0)]), DuplicatePolicy::Accept)
            .unwrap();
        let lifted = root.compact_dim(2);
        assert!(lifted.is_some());
        assert_eq!(root.attributes.len(), 1);
        for child in &root.children {
            assert!(attribute::find(&child.attributes, 2).is_none());
        }
    }

    #[test]
    fn compact_leaves_non_uniform_value_in_place() {
        let s = schema();
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 1.0)]), DuplicatePolicy::Accept)
            .unwrap();
        root.insert(Node::leaf("abcfg", vec![z_attr(&s, 2.0)]), DuplicatePolicy::Accept)
            .unwrap();
        assert!(root.compact_dim(2).is_none());
        assert!(root.attributes.is_empty());
    }

    #[test]
    fn filter_collapses_single_surviving_child() {
        let s = schema();
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 100.0)]), DuplicatePolicy::Accept)
            .unwrap();
        root.insert(Node::leaf("abcfg", vec![z_attr(&s, 200.0)]), DuplicatePolicy::Accept)
            .unwrap();
        let filtered = root.filter(&s, 2, &Predicate::Eq(100.0), &[]).unwrap().unwrap();
        assert_eq!(filtered.fragment, "abcde");
        assert!(filtered.is_leaf());
    }

    #[test]
    fn filter_drops_non_matching_subtree_entirely() {
        let s = schema();
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 100.0)]), DuplicatePolicy::Accept)
            .unwrap();
        let result = root.filter(&s, 2, &Predicate::Eq(999.0), &[]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn filter_collapse_keeps_attributes_lifted_by_compaction() {
        let s = tag_schema();
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![z_attr(&s, 42.0), tag_attr(&s, 1.0)]), DuplicatePolicy::Accept)
            .unwrap();
        root.insert(Node::leaf("abcfg", vec![z_attr(&s, 42.0), tag_attr(&s, 2.0)]), DuplicatePolicy::Accept)
            .unwrap();
        // Both leaves agree on Z, so compaction lifts it onto the "abc" branch and
        // strips it from the leaves themselves.
        assert!(root.compact_dim(2).is_some());

        // Filtering on Tag leaves exactly one child under "abc", collapsing the
        // branch into it. The lifted Z must survive the collapse.
        let filtered = root.filter(&s, 3, &Predicate::Eq(1.0), &[]).unwrap().unwrap();
        assert_eq!(filtered.fragment, "abcde");
        let z = attribute::find(&filtered.attributes, 2).expect("Z lifted by compaction must survive the collapse");
        assert_eq!(z.unpack(s.dimension_by_index(2).unwrap()), 42.0);
        let tag = attribute::find(&filtered.attributes, 3).unwrap();
        assert_eq!(tag.unpack(s.dimension_by_index(3).unwrap()), 1.0);
    }

    #[test]
    fn to_nodelist_is_depth_first_left_to_right() {
        let mut root = Node::empty_root();
        root.insert(Node::leaf("abcde", vec![]), DuplicatePolicy::Reject).unwrap();
        root.insert(Node::leaf("abcfg", vec![]), DuplicatePolicy::Reject).unwrap();
        root.insert(Node::leaf("zzz", vec![]), DuplicatePolicy::Reject).unwrap();
        let mut out = Vec::new();
        root.to_nodelist("", &[], &mut out);
        let hashes: Vec<&str> = out.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(hashes, vec!["abcde", "abcfg", "zzz"]);
    }
}
