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

//! A packed, single-dimension attribute value.
//!
//! The source data model describes attributes at a node as a singly linked
//! chain. We keep the same "at most one entry per dimension, order
//! otherwise unspecified" semantics but back it with a `Vec`, the way the
//! rest of this corpus represents small per-node collections (compare
//! `pfx_vec`/`ptr_vec` in a prefix-tree node, or a `SmallVec` of label
//! counts) rather than hand-rolling an intrusive linked list.
use crate::dimension::Dimension;
use crate::types::Type;
use core_ght::{GhtError, GhtResult};

/// Up to double/int64: the widest packed value this crate stores.
pub const ATTRIBUTE_MAX_SIZE: usize = 8;

/// A single dimension's packed value at a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribute {
    /// Position of the owning dimension within its schema.
    pub dim_position: u8,
    width: u8,
    bytes: [u8; ATTRIBUTE_MAX_SIZE],
}

fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

macro_rules! pack_int {
    ($name:expr, $ty:ty, $raw:expr, $bytes:expr) => {{
        let clamped: $ty = if $raw > <$ty>::MAX as f64 {
            log::warn!(
                "{} dimension: value {} overflows {}, clamping to {}",
                $name,
                $raw,
                stringify!($ty),
                <$ty>::MAX
            );
            <$ty>::MAX
        } else if $raw < <$ty>::MIN as f64 {
            log::warn!(
                "{} dimension: value {} underflows {}, clamping to {}",
                $name,
                $raw,
                stringify!($ty),
                <$ty>::MIN
            );
            <$ty>::MIN
        } else {
            $raw as $ty
        };
        $bytes[..std::mem::size_of::<$ty>()].copy_from_slice(&clamped.to_le_bytes());
    }};
}

impl Attribute {
    /// Packs a scaled (real-world) value for `dim` into a new attribute.
    ///
    /// `raw = (scaled - offset) / scale` for every type, float or integer:
    /// a `Z` dimension scaled by `0.01` stores a raw value in hundredths
    /// regardless of whether its packed width is an integer or a double.
    /// Integer types round `raw` half-to-even and clamp (logging a warning)
    /// on overflow of the target width; float types store `raw` directly,
    /// with no rounding or clamping.
    pub fn pack(dim: &Dimension, scaled: f64) -> GhtResult<Attribute> {
        if dim.scale == 0.0 {
            return Err(GhtError::Schema(format!("dimension {:?} has a zero scale", dim.name)));
        }
        let mut bytes = [0u8; ATTRIBUTE_MAX_SIZE];
        let width = dim.dtype.width() as u8;
        let raw = (scaled - dim.offset) / dim.scale;

        if dim.dtype.is_float() {
            match dim.dtype {
                Type::F32 => bytes[..4].copy_from_slice(&(raw as f32).to_le_bytes()),
                Type::F64 => bytes[..8].copy_from_slice(&raw.to_le_bytes()),
                _ => unreachable!(),
            }
        } else {
            let raw = round_half_even(raw);
            match dim.dtype {
                Type::I8 => pack_int!(dim.name, i8, raw, bytes),
                Type::U8 => pack_int!(dim.name, u8, raw, bytes),
                Type::I16 => pack_int!(dim.name, i16, raw, bytes),
                Type::U16 => pack_int!(dim.name, u16, raw, bytes),
                Type::I32 => pack_int!(dim.name, i32, raw, bytes),
                Type::U32 => pack_int!(dim.name, u32, raw, bytes),
                Type::I64 => pack_int!(dim.name, i64, raw, bytes),
                Type::U64 => pack_int!(dim.name, u64, raw, bytes),
                Type::F32 | Type::F64 => unreachable!(),
            }
        }

        Ok(Attribute {
            dim_position: dim.position,
            width,
            bytes,
        })
    }

    /// Builds an attribute directly from its packed little-endian bytes.
    pub fn from_bytes(dim_position: u8, width: u8, src: &[u8]) -> GhtResult<Attribute> {
        if src.len() != width as usize || width as usize > ATTRIBUTE_MAX_SIZE {
            return Err(GhtError::Format(format!(
                "expected {} packed bytes, got {}",
                width,
                src.len()
            )));
        }
        let mut bytes = [0u8; ATTRIBUTE_MAX_SIZE];
        bytes[..src.len()].copy_from_slice(src);
        Ok(Attribute { dim_position, width, bytes })
    }

    /// The packed bytes, truncated to this attribute's width.
    pub fn packed_bytes(&self) -> &[u8] {
        &self.bytes[..self.width as usize]
    }

    /// Byte width of the packed value.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Reverses [`Attribute::pack`]: returns the scaled (real-world) value.
    pub fn unpack(&self, dim: &Dimension) -> f64 {
        let raw: f64 = match dim.dtype {
            Type::I8 => i8::from_le_bytes(self.bytes[..1].try_into().unwrap()) as f64,
            Type::U8 => u8::from_le_bytes(self.bytes[..1].try_into().unwrap()) as f64,
            Type::I16 => i16::from_le_bytes(self.bytes[..2].try_into().unwrap()) as f64,
            Type::U16 => u16::from_le_bytes(self.bytes[..2].try_into().unwrap()) as f64,
            Type::I32 => i32::from_le_bytes(self.bytes[..4].try_into().unwrap()) as f64,
            Type::U32 => u32::from_le_bytes(self.bytes[..4].try_into().unwrap()) as f64,
            Type::I64 => i64::from_le_bytes(self.bytes[..8].try_into().unwrap()) as f64,
            Type::U64 => u64::from_le_bytes(self.bytes[..8].try_into().unwrap()) as f64,
            Type::F32 => f32::from_le_bytes(self.bytes[..4].try_into().unwrap()) as f64,
            Type::F64 => f64::from_le_bytes(self.bytes[..8].try_into().unwrap()),
        };
        raw * dim.scale + dim.offset
    }
}

/// Merges two attribute sets: every dimension present in `a` keeps `a`'s
/// value; dimensions present only in `b` are appended. Same-dimension
/// conflicts resolve first-write-wins, i.e. in favor of `a` — see the
/// `duplicates=accept` design note on [`crate::schema`].
///
/// `union(a, &[]) == a`, and union is associative up to dimension-set
/// equality: grouping which chain is merged first never changes which
/// dimensions end up present, only (for ties) whose value survives.
pub fn union(a: &[Attribute], b: &[Attribute]) -> Vec<Attribute> {
    let mut out = a.to_vec();
    for attr in b {
        if !out.iter().any(|x| x.dim_position == attr.dim_position) {
            out.push(*attr);
        }
    }
    out
}

/// Looks up the attribute for a given dimension position, if present.
pub fn find(attrs: &[Attribute], dim_position: u8) -> Option<&Attribute> {
    attrs.iter().find(|a| a.dim_position == dim_position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;

    fn dim(position: u8, dtype: Type, scale: f64, offset: f64) -> Dimension {
        Dimension::new(position, "d".into(), "".into(), dtype, scale, offset)
    }

    #[test]
    fn pack_unpack_round_trip_scaled_int() {
        let d = dim(2, Type::I32, 0.01, 0.0);
        let attr = Attribute::pack(&d, 120.5).unwrap();
        assert_eq!(attr.unpack(&d), 120.5);
    }

    #[test]
    fn pack_unpack_round_trip_float() {
        let d = dim(2, Type::F64, 1.0, 0.0);
        let attr = Attribute::pack(&d, 42.125).unwrap();
        assert_eq!(attr.unpack(&d), 42.125);
    }

    #[test]
    fn pack_unpack_round_trip_scaled_float() {
        let d = dim(2, Type::F64, 0.01, 0.0);
        let attr = Attribute::pack(&d, 120.5).unwrap();
        assert_eq!(attr.unpack(&d), 120.5);
    }

    #[test]
    fn overflow_clamps_instead_of_erroring() {
        let d = dim(2, Type::U8, 1.0, 0.0);
        let attr = Attribute::pack(&d, 1000.0).unwrap();
        assert_eq!(attr.unpack(&d), 255.0);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let d = dim(2, Type::I32, 0.0, 0.0);
        assert!(Attribute::pack(&d, 1.0).is_err());
    }

    #[test]
    fn union_prefers_a_and_appends_new_from_b() {
        let d0 = dim(2, Type::I32, 1.0, 0.0);
        let mut d1 = dim(3, Type::I32, 1.0, 0.0);
        d1.position = 3;
        let a = vec![Attribute::pack(&d0, 1.0).unwrap()];
        let b = vec![Attribute::pack(&d0, 2.0).unwrap(), Attribute::pack(&d1, 3.0).unwrap()];
        let merged = union(&a, &b);
        assert_eq!(merged.len(), 2);
        assert_eq!(find(&merged, 2).unwrap().unpack(&d0), 1.0);
        assert_eq!(find(&merged, 3).unwrap().unpack(&d1), 3.0);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let d0 = dim(2, Type::I32, 1.0, 0.0);
        let a = vec![Attribute::pack(&d0, 1.0).unwrap()];
        assert_eq!(union(&a, &[]), a);
    }
}
