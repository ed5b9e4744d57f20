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

#![allow(dead_code)]
#![warn(missing_docs)]

//! # ghtree
//! A hash-prefix tree for organizing large point clouds by spatial
//! locality. Points are keyed by a geohash-style encoding of their
//! coordinates; attributes shared by every point under a subtree are
//! compacted up to the lowest common ancestor instead of repeated per
//! point.

pub mod errors;
pub use errors::{GhtError, GhtResult};

pub mod config;
pub use config::{Config, DuplicatePolicy};

pub mod node;
pub use node::{Node, Predicate, FILTER_EPSILON};

pub mod tree;
pub use tree::Tree;

pub mod nodelist;
pub use nodelist::{tree_from_nodelist, NodeList};

pub mod serializer;
pub use serializer::{read_tree, write_tree};

pub mod io;
pub use io::{read_tree_from_bytes, read_tree_from_file, write_tree_to_bytes, write_tree_to_file};

pub use core_ght::hash::{Area, Coordinate};
pub use geocloud::{Attribute, Dimension, Schema, Type};
