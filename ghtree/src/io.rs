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

//! File and in-memory-buffer entry points over the binary serializer.
//!
//! `write_tree`/`read_tree` in [`crate::serializer`] already work over any
//! `std::io::Write`/`Read`, which a `File` and a `Cursor<Vec<u8>>` both
//! implement — there is no need for a bespoke stream trait to get a
//! "file or growable buffer" abstraction in Rust.
use crate::errors::GhtResult;
use crate::serializer::{read_tree, write_tree};
use crate::tree::Tree;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;

/// Writes `tree` to a file at `path`, creating or truncating it.
pub fn write_tree_to_file(tree: &Tree, path: impl AsRef<Path>) -> GhtResult<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    write_tree(tree, &mut w)
}

/// Reads a tree from a file at `path`.
pub fn read_tree_from_file(path: impl AsRef<Path>) -> GhtResult<Tree> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);
    read_tree(&mut r)
}

/// Serializes `tree` into a growable in-memory buffer.
pub fn write_tree_to_bytes(tree: &Tree) -> GhtResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    write_tree(tree, &mut buf)?;
    Ok(buf.into_inner())
}

/// Reads a tree from an in-memory buffer previously produced by
/// [`write_tree_to_bytes`].
pub fn read_tree_from_bytes(bytes: &[u8]) -> GhtResult<Tree> {
    let mut cursor = Cursor::new(bytes);
    read_tree(&mut cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DuplicatePolicy};
    use core_ght::hash::Coordinate;
    use geocloud::{Dimension, Schema, Type};

    fn sample_tree() -> Tree {
        let schema = Schema::new(vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "Y".into(), "".into(), Type::F64, 1.0, 0.0),
        ])
        .unwrap();
        let mut tree = Tree::new(schema, Config::new(DuplicatePolicy::Reject));
        tree.insert_point(&Coordinate::new(-122.4, 37.8), 10, vec![]).unwrap();
        tree.insert_point(&Coordinate::new(-122.41, 37.8), 10, vec![]).unwrap();
        tree
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let tree = sample_tree();
        let dir = tempdir::TempDir::new("ghtree-io-test").unwrap();
        let path = dir.path().join("tree.ght");

        write_tree_to_file(&tree, &path).unwrap();
        let read_back = read_tree_from_file(&path).unwrap();

        assert_eq!(read_back.to_nodelist(), tree.to_nodelist());
    }

    #[test]
    fn round_trips_through_bytes() {
        let tree = sample_tree();
        let bytes = write_tree_to_bytes(&tree).unwrap();
        let read_back = read_tree_from_bytes(&bytes).unwrap();
        assert_eq!(read_back.to_nodelist(), tree.to_nodelist());
    }
}
