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

//! Geohash-style encode/decode over a 2D coordinate domain, and the
//! longest-common-prefix matching used by node insertion.
use crate::errors::{GhtError, GhtResult};

/// The standard geohash base-32 alphabet.
pub const BASE32_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Maximum resolution (hash length in characters) this crate supports.
pub const MAX_HASH_LEN: usize = 20;

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Longitude, in `[-180, 180]`.
    pub x: f64,
    /// Latitude, in `[-90, 90]`.
    pub y: f64,
}

impl Coordinate {
    /// Builds a coordinate without checking bounds.
    pub fn new(x: f64, y: f64) -> Coordinate {
        Coordinate { x, y }
    }
}

/// An axis-aligned rectangle over the coordinate domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Area {
    /// The midpoint of the area.
    pub fn center(&self) -> Coordinate {
        Coordinate {
            x: (self.x_min + self.x_max) / 2.0,
            y: (self.y_min + self.y_max) / 2.0,
        }
    }
}

fn alphabet_index(c: u8) -> GhtResult<u8> {
    BASE32_ALPHABET
        .iter()
        .position(|&b| b == c)
        .map(|i| i as u8)
        .ok_or_else(|| GhtError::InvalidHash(format!("character {:?} is not in the base-32 geohash alphabet", c as char)))
}

/// Checks that every character of `hash` is in the base-32 alphabet and that
/// its length does not exceed [`MAX_HASH_LEN`]. The empty hash is valid (it is
/// the global root prefix).
pub fn validate(hash: &str) -> GhtResult<()> {
    if hash.len() > MAX_HASH_LEN {
        return Err(GhtError::InvalidHash(format!(
            "hash {:?} exceeds MAX_HASH_LEN ({})",
            hash, MAX_HASH_LEN
        )));
    }
    for c in hash.bytes() {
        alphabet_index(c)?;
    }
    Ok(())
}

/// Encodes a coordinate into a geohash of the given resolution (length in characters).
pub fn encode(coord: &Coordinate, resolution: usize) -> GhtResult<String> {
    if !(-180.0..=180.0).contains(&coord.x) || !(-90.0..=90.0).contains(&coord.y) {
        return Err(GhtError::InvalidCoordinate { x: coord.x, y: coord.y });
    }
    let resolution = resolution.min(MAX_HASH_LEN);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut is_lon = true;
    let mut bit = 0u8;
    let mut ch = 0u8;
    let mut hash = String::with_capacity(resolution);

    while hash.len() < resolution {
        if is_lon {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if coord.x >= mid {
                ch |= 1 << (4 - bit);
                lon_range.0 = mid;
            } else {
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if coord.y >= mid {
                ch |= 1 << (4 - bit);
                lat_range.0 = mid;
            } else {
                lat_range.1 = mid;
            }
        }
        is_lon = !is_lon;
        if bit == 4 {
            hash.push(BASE32_ALPHABET[ch as usize] as char);
            bit = 0;
            ch = 0;
        } else {
            bit += 1;
        }
    }
    Ok(hash)
}

/// Returns the bounding cell of a geohash. The empty hash bounds the whole domain.
pub fn decode_area(hash: &str) -> GhtResult<Area> {
    validate(hash)?;
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut is_lon = true;

    for c in hash.bytes() {
        let idx = alphabet_index(c)?;
        for bit_pos in (0..5).rev() {
            let bit = (idx >> bit_pos) & 1;
            if is_lon {
                let mid = (lon_range.0 + lon_range.1) / 2.0;
                if bit == 1 {
                    lon_range.0 = mid;
                } else {
                    lon_range.1 = mid;
                }
            } else {
                let mid = (lat_range.0 + lat_range.1) / 2.0;
                if bit == 1 {
                    lat_range.0 = mid;
                } else {
                    lat_range.1 = mid;
                }
            }
            is_lon = !is_lon;
        }
    }
    Ok(Area {
        x_min: lon_range.0,
        y_min: lat_range.0,
        x_max: lon_range.1,
        y_max: lat_range.1,
    })
}

/// Returns the midpoint of a geohash's bounding cell.
pub fn decode_center(hash: &str) -> GhtResult<Coordinate> {
    Ok(decode_area(hash)?.center())
}

/// The length of the shared prefix of `a` and `b`, capped at `max_len`.
///
/// Returns `-1` if both are non-empty and their first characters differ,
/// `0` if either is empty.
pub fn common_length(a: &str, b: &str, max_len: usize) -> i64 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let ab = a.as_bytes();
    let bb = b.as_bytes();
    if ab[0] != bb[0] {
        return -1;
    }
    let mut n = 0usize;
    while n < ab.len() && n < bb.len() && n < max_len && ab[n] == bb[n] {
        n += 1;
    }
    n as i64
}

/// The kind of relationship between two hash fragments, as classified by [`hash_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchClass {
    /// Neither hash is empty, and their first characters differ.
    None,
    /// One of the two hashes is the empty (global) prefix.
    Global,
    /// The two hashes are identical.
    Same,
    /// One hash is a proper prefix of the other.
    Child,
    /// The two hashes share a non-empty, non-identical common prefix.
    Split,
}

/// Classifies the relationship between `a` and `b` and returns the suffix of
/// each beyond their common prefix, per the table in the hash codec contract.
pub fn hash_match<'a, 'b>(a: &'a str, b: &'b str, max_len: usize) -> (MatchClass, &'a str, &'b str) {
    if a.is_empty() || b.is_empty() {
        return (MatchClass::Global, a, b);
    }
    let common = common_length(a, b, max_len);
    if common == -1 {
        return (MatchClass::None, a, b);
    }
    let common = common as usize;
    match (common == a.len(), common == b.len()) {
        (true, true) => (MatchClass::Same, "", ""),
        (true, false) => (MatchClass::Child, "", &b[common..]),
        (false, true) => (MatchClass::Child, &a[common..], ""),
        (false, false) => (MatchClass::Split, &a[common..], &b[common..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_same() {
        assert_eq!(hash_match("abcde", "abcde", 5), (MatchClass::Same, "", ""));
    }

    #[test]
    fn match_global() {
        assert_eq!(hash_match("", "abcde", 5), (MatchClass::Global, "", "abcde"));
    }

    #[test]
    fn match_child() {
        assert_eq!(hash_match("abc", "abcde", 5), (MatchClass::Child, "", "de"));
    }

    #[test]
    fn match_split() {
        assert_eq!(hash_match("abcde", "abcpq", 5), (MatchClass::Split, "de", "pq"));
    }

    #[test]
    fn match_none() {
        assert_eq!(hash_match("abc", "1abc", 5), (MatchClass::None, "abc", "1abc"));
    }

    #[test]
    fn common_length_examples() {
        assert_eq!(common_length("abcdef", "abc", 3), 3);
        assert_eq!(common_length("abc", "abcdef", 3), 3);
        assert_eq!(common_length("abc", "", 3), 0);
        assert_eq!(common_length("abcdef", "abcdef", 2), 2);
        assert_eq!(common_length("abc", "1abc", 3), -1);
    }

    #[test]
    fn encode_is_deterministic() {
        let c = Coordinate::new(-126.4, 45.3);
        assert_eq!(encode(&c, 10).unwrap(), encode(&c, 10).unwrap());
    }

    #[test]
    fn encode_rejects_out_of_range() {
        assert!(encode(&Coordinate::new(200.0, 0.0), 5).is_err());
        assert!(encode(&Coordinate::new(0.0, -95.0), 5).is_err());
    }

    #[test]
    fn decode_center_within_area() {
        let c = Coordinate::new(-126.4, 45.3);
        let hash = encode(&c, 12).unwrap();
        let area = decode_area(&hash).unwrap();
        let center = decode_center(&hash).unwrap();
        assert!(center.x >= area.x_min && center.x <= area.x_max);
        assert!(center.y >= area.y_min && center.y <= area.y_max);
        assert!(area.x_max - area.x_min < 1e-2);
        assert!(area.y_max - area.y_min < 1e-2);
    }

    #[test]
    fn validate_rejects_bad_chars_and_overlong() {
        assert!(validate("bcdg").is_ok());
        assert!(validate("bcdi").is_err()); // 'i' is not in the alphabet
        assert!(validate(&"0".repeat(MAX_HASH_LEN + 1)).is_err());
    }
}
