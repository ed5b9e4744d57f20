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

//! An ordered, immutable list of [`Dimension`]s shared by all points in a tree.
use crate::dimension::Dimension;
use core_ght::{GhtError, GhtResult};
use serde::{Deserialize, Serialize};

/// The ordered dimension list for a tree. By convention the first two
/// dimensions are the X and Y used for hashing; the rest are payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    dims: Vec<Dimension>,
}

impl Schema {
    /// Builds a schema from an ordered dimension list.
    ///
    /// Fails with `GhtError::Schema` if any two dimensions share a name, if
    /// there are fewer than two dimensions (X and Y are mandatory), or if a
    /// dimension's `position` does not match its slot in `dims` — attribute
    /// packing and the binary serializer both key on `position` as a direct
    /// index into this list, so the two must never drift apart.
    pub fn new(dims: Vec<Dimension>) -> GhtResult<Schema> {
        if dims.len() < 2 {
            return Err(GhtError::Schema("a schema needs at least an X and a Y dimension".into()));
        }
        for (i, a) in dims.iter().enumerate() {
            if a.position as usize != i {
                return Err(GhtError::Schema(format!(
                    "dimension {:?} has position {} but is at schema index {}",
                    a.name, a.position, i
                )));
            }
            for b in &dims[i + 1..] {
                if a.name == b.name {
                    return Err(GhtError::Schema(format!("duplicate dimension name {:?}", a.name)));
                }
            }
        }
        Ok(Schema { dims })
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// True if the schema has no dimensions (never true for a validly constructed schema).
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// All dimensions, in schema order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// The X dimension (first in schema order), used for hashing.
    pub fn x_dim(&self) -> &Dimension {
        &self.dims[0]
    }

    /// The Y dimension (second in schema order), used for hashing.
    pub fn y_dim(&self) -> &Dimension {
        &self.dims[1]
    }

    /// Looks up a dimension by name.
    pub fn dimension_by_name(&self, name: &str) -> GhtResult<&Dimension> {
        self.dims
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| GhtError::NotFound(format!("dimension named {:?}", name)))
    }

    /// Looks up a dimension by schema index.
    pub fn dimension_by_index(&self, index: usize) -> GhtResult<&Dimension> {
        self.dims
            .get(index)
            .ok_or_else(|| GhtError::NotFound(format!("dimension at index {}", index)))
    }

    /// Two schemas are the same iff they have the same dimensions, in the same order.
    pub fn same(&self, other: &Schema) -> bool {
        self.dims.len() == other.dims.len() && self.dims.iter().zip(&other.dims).all(|(a, b)| a.same(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn xyz() -> Schema {
        Schema::new(vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "Y".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(2, "Z".into(), "".into(), Type::F64, 0.01, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_names_rejected() {
        let dims = vec![
            Dimension::new(0, "X".into(), "".into(), Type::F64, 1.0, 0.0),
            Dimension::new(1, "X".into(), "".into(), Type::F64, 1.0, 0.0),
        ];
        assert!(Schema::new(dims).is_err());
    }

    #[test]
    fn lookup_by_name_and_index() {
        let s = xyz();
        assert_eq!(s.dimension_by_name("Z").unwrap().position, 2);
        assert_eq!(s.dimension_by_index(2).unwrap().name, "Z");
        assert!(s.dimension_by_name("Nope").is_err());
        assert!(s.dimension_by_index(9).is_err());
    }

    #[test]
    fn same_ignores_description() {
        let mut other = xyz();
        let mut dims = other.dims.clone();
        dims[2].description = "changed".into();
        other = Schema::new(dims).unwrap();
        assert!(xyz().same(&other));
    }
}
