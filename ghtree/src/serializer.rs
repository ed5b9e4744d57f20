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

//! Depth-first, length-prefixed binary encoding of a tree. Fixed-width
//! fields are little-endian regardless of host, via `byteorder`.
use crate::config::Config;
use crate::errors::{GhtError, GhtResult};
use crate::node::Node;
use crate::tree::Tree;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use core_ght::hash::{validate, MAX_HASH_LEN};
use geocloud::{Attribute, Dimension, Schema, Type};
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"GHT\0";
const VERSION: u8 = 1;
const ENDIAN_LITTLE: u8 = 1;

/// Writes `tree` to `w` in the `Header Schema Root` wire format.
pub fn write_tree<W: Write>(tree: &Tree, w: &mut W) -> GhtResult<()> {
    w.write_all(MAGIC)?;
    w.write_u8(VERSION)?;
    w.write_u8(ENDIAN_LITTLE)?;
    w.write_u8(0)?; // flags: reserved, always written zero (see open question on ghtFlag)
    w.write_u8(0)?; // reserved
    write_schema(tree.schema(), w)?;
    write_node(tree.root(), w)
}

/// Reads a tree previously written by [`write_tree`]. The schema carried
/// in the stream becomes the returned tree's schema; its configuration is
/// always the default (`duplicates: reject`), since config is not part of
/// the wire format.
pub fn read_tree<R: Read>(r: &mut R) -> GhtResult<Tree> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(GhtError::Format("stream does not start with the GHT magic".into()));
    }
    let version = r.read_u8()?;
    if version != VERSION {
        return Err(GhtError::Format(format!("unsupported stream version {}", version)));
    }
    let _endian = r.read_u8()?;
    let _flags = r.read_u8()?;
    let _reserved = r.read_u8()?;

    let schema = read_schema(r)?;
    let root = read_node(r, &schema)?;
    let num_points = root.leaf_count() as u64;
    Ok(Tree::from_parts(schema, Config::default(), root, num_points))
}

fn write_schema<W: Write>(schema: &Schema, w: &mut W) -> GhtResult<()> {
    w.write_u16::<LittleEndian>(schema.len() as u16)?;
    for dim in schema.dimensions() {
        write_dimension(dim, w)?;
    }
    Ok(())
}

fn write_dimension<W: Write>(dim: &Dimension, w: &mut W) -> GhtResult<()> {
    w.write_u8(dim.dtype.wire_tag())?;
    w.write_f64::<LittleEndian>(dim.scale)?;
    w.write_f64::<LittleEndian>(dim.offset)?;
    write_lp_string(&dim.name, w)?;
    write_lp_string(&dim.description, w)
}

fn write_lp_string<W: Write>(s: &str, w: &mut W) -> GhtResult<()> {
    let bytes = s.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(GhtError::Format(format!("string {:?} is longer than the u16 length prefix allows", s)));
    }
    w.write_u16::<LittleEndian>(bytes.len() as u16)?;
    w.write_all(bytes)?;
    Ok(())
}

fn write_node<W: Write>(node: &Node, w: &mut W) -> GhtResult<()> {
    let hash_bytes = node.fragment.as_bytes();
    if hash_bytes.len() > u8::MAX as usize {
        return Err(GhtError::Format("hash fragment longer than 255 bytes".into()));
    }
    w.write_u8(hash_bytes.len() as u8)?;
    w.write_all(hash_bytes)?;

    if node.attributes.len() > u8::MAX as usize {
        return Err(GhtError::Format("node has more than 255 attributes".into()));
    }
    w.write_u8(node.attributes.len() as u8)?;
    for attr in &node.attributes {
        w.write_u8(attr.dim_position)?;
        w.write_all(attr.packed_bytes())?;
    }

    if node.children.len() > u8::MAX as usize {
        return Err(GhtError::Format("node has more than 255 children".into()));
    }
    w.write_u8(node.children.len() as u8)?;
    for child in &node.children {
        write_node(child, w)?;
    }
    Ok(())
}

fn read_schema<R: Read>(r: &mut R) -> GhtResult<Schema> {
    let num_dims = r.read_u16::<LittleEndian>()?;
    let mut dims = Vec::with_capacity(num_dims as usize);
    for position in 0..num_dims {
        dims.push(read_dimension(r, position as u8)?);
    }
    Schema::new(dims)
}

fn read_dimension<R: Read>(r: &mut R, position: u8) -> GhtResult<Dimension> {
    let dtype = Type::from_wire_tag(r.read_u8()?)?;
    let scale = r.read_f64::<LittleEndian>()?;
    let offset = r.read_f64::<LittleEndian>()?;
    let name = read_lp_string(r)?;
    let description = read_lp_string(r)?;
    Ok(Dimension::new(position, name, description, dtype, scale, offset))
}

fn read_lp_string<R: Read>(r: &mut R) -> GhtResult<String> {
    let len = r.read_u16::<LittleEndian>()?;
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| GhtError::Format(format!("string in stream is not valid utf-8: {}", e)))
}

fn read_node<R: Read>(r: &mut R, schema: &Schema) -> GhtResult<Node> {
    let hash_len = r.read_u8()? as usize;
    if hash_len > MAX_HASH_LEN {
        return Err(GhtError::Format(format!("hash_len {} exceeds MAX_HASH_LEN ({})", hash_len, MAX_HASH_LEN)));
    }
    let mut hash_bytes = vec![0u8; hash_len];
    r.read_exact(&mut hash_bytes)?;
    let fragment = String::from_utf8(hash_bytes)
        .map_err(|e| GhtError::Format(format!("hash fragment in stream is not valid utf-8: {}", e)))?;
    validate(&fragment)?;

    let attr_count = r.read_u8()?;
    let mut attributes = Vec::with_capacity(attr_count as usize);
    for _ in 0..attr_count {
        let dim_position = r.read_u8()?;
        let dim = schema.dimension_by_index(dim_position as usize).map_err(|_| {
            GhtError::Format(format!("attribute references dimension {} outside the schema", dim_position))
        })?;
        let width = dim.dtype.width();
        let mut value = vec![0u8; width];
        r.read_exact(&mut value)?;
        attributes.push(Attribute::from_bytes(dim_position, width as u8, &value)?);
    }

    let child_count = r.read_u8()?;
    let mut children = Vec::with_capacity(child_count as usize);
    for _ in 0..child_count {
        children.push(read_node(r, schema)?);
    }

    Ok(Node { fragment, children, attributes })
}
