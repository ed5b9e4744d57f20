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

//! The closed set of attribute value types.
use core_ght::{GhtError, GhtResult};
use serde::{Deserialize, Serialize};

/// One of the ten scalar types an attribute dimension can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Type {
    /// Byte width of the packed representation.
    pub fn width(self) -> usize {
        match self {
            Type::I8 | Type::U8 => 1,
            Type::I16 | Type::U16 => 2,
            Type::I32 | Type::U32 | Type::F32 => 4,
            Type::I64 | Type::U64 | Type::F64 => 8,
        }
    }

    /// True for `F32`/`F64`, which round-trip directly without scale/offset.
    pub fn is_float(self) -> bool {
        matches!(self, Type::F32 | Type::F64)
    }

    /// The wire-format byte tag for this type, per the binary serializer's `Attribute` layout.
    pub fn wire_tag(self) -> u8 {
        match self {
            Type::I8 => 0,
            Type::U8 => 1,
            Type::I16 => 2,
            Type::U16 => 3,
            Type::I32 => 4,
            Type::U32 => 5,
            Type::I64 => 6,
            Type::U64 => 7,
            Type::F32 => 8,
            Type::F64 => 9,
        }
    }

    /// Recovers a `Type` from its wire-format tag.
    pub fn from_wire_tag(tag: u8) -> GhtResult<Type> {
        Ok(match tag {
            0 => Type::I8,
            1 => Type::U8,
            2 => Type::I16,
            3 => Type::U16,
            4 => Type::I32,
            5 => Type::U32,
            6 => Type::I64,
            7 => Type::U64,
            8 => Type::F32,
            9 => Type::F64,
            other => return Err(GhtError::Format(format!("unknown dimension type tag {}", other))),
        })
    }

    /// Maps an XML `<pc:interpretation>` string (e.g. `"int8_t"`, `"double"`) to a `Type`.
    pub fn from_interpretation(s: &str) -> GhtResult<Type> {
        Ok(match s {
            "int8_t" => Type::I8,
            "uint8_t" => Type::U8,
            "int16_t" => Type::I16,
            "uint16_t" => Type::U16,
            "int32_t" => Type::I32,
            "uint32_t" => Type::U32,
            "int64_t" => Type::I64,
            "uint64_t" => Type::U64,
            "float" => Type::F32,
            "double" => Type::F64,
            other => return Err(GhtError::Schema(format!("unknown dimension interpretation {:?}", other))),
        })
    }

    /// The XML `<pc:interpretation>` string for this type.
    pub fn interpretation(self) -> &'static str {
        match self {
            Type::I8 => "int8_t",
            Type::U8 => "uint8_t",
            Type::I16 => "int16_t",
            Type::U16 => "uint16_t",
            Type::I32 => "int32_t",
            Type::U32 => "uint32_t",
            Type::I64 => "int64_t",
            Type::U64 => "uint64_t",
            Type::F32 => "float",
            Type::F64 => "double",
        }
    }
}
