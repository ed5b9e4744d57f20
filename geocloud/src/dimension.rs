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

//! A named, typed, scaled column in the per-point attribute tuple.
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// A single column of a [`crate::schema::Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Position of this dimension within its schema.
    pub position: u8,
    /// Unique (within a schema) name, e.g. `"Z"` or `"Intensity"`.
    pub name: String,
    /// Free-form human-readable description. Not considered by [`Dimension::same`].
    pub description: String,
    /// The packed storage type.
    pub dtype: Type,
    /// Multiplier applied when unpacking a raw integer value.
    pub scale: f64,
    /// Offset applied when unpacking a raw integer value.
    pub offset: f64,
}

impl Dimension {
    /// Builds a new dimension.
    pub fn new(position: u8, name: String, description: String, dtype: Type, scale: f64, offset: f64) -> Dimension {
        Dimension {
            position,
            name,
            description,
            dtype,
            scale,
            offset,
        }
    }

    /// Two dimensions are the same iff every field but `description` matches.
    pub fn same(&self, other: &Dimension) -> bool {
        self.position == other.position
            && self.name == other.name
            && self.dtype == other.dtype
            && self.scale == other.scale
            && self.offset == other.offset
    }
}
