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

//! The closed error taxonomy shared by every crate in the workspace.
use std::error::Error;
use std::fmt;
use std::io;

/// Helper type for a call that could go wrong.
pub type GhtResult<T> = Result<T, GhtError>;

/// The closed set of ways a hash-prefix tree operation can fail.
#[derive(Debug)]
pub enum GhtError {
    /// X/Y outside Earth bounds.
    InvalidCoordinate {
        /// The offending x (longitude) value.
        x: f64,
        /// The offending y (latitude) value.
        y: f64,
    },
    /// Character outside the base-32 alphabet, or a hash longer than `MAX_HASH_LEN`.
    InvalidHash(String),
    /// A duplicate leaf was rejected by the tree's duplicates policy.
    Duplicate,
    /// A dimension name or index is missing from a schema.
    NotFound(String),
    /// A schema conflict: duplicate dimension name, unknown type, or missing position.
    Schema(String),
    /// A binary or XML parse error.
    Format(String),
    /// An underlying read or write failed.
    IoError(io::Error),
    /// Hex codec failure: odd-length or non-hex input.
    InvalidHex(String),
    /// An internal invariant was violated (a bug, not a user error).
    Invariant(String),
}

impl fmt::Display for GhtError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GhtError::InvalidCoordinate { x, y } => {
                write!(f, "coordinate ({}, {}) is outside [-180,180] x [-90,90]", x, y)
            }
            GhtError::InvalidHash(h) => write!(f, "invalid geohash: {:?}", h),
            GhtError::Duplicate => write!(f, "duplicate leaf rejected by duplicates policy"),
            GhtError::NotFound(what) => write!(f, "not found: {}", what),
            GhtError::Schema(msg) => write!(f, "schema error: {}", msg),
            GhtError::Format(msg) => write!(f, "format error: {}", msg),
            GhtError::IoError(e) => write!(f, "{}", e),
            GhtError::InvalidHex(s) => write!(f, "invalid hex input: {:?}", s),
            GhtError::Invariant(msg) => write!(f, "internal invariant violated: {}", msg),
        }
    }
}

#[allow(deprecated)]
impl Error for GhtError {
    fn description(&self) -> &str {
        match self {
            GhtError::InvalidCoordinate { .. } => "coordinate outside Earth bounds",
            GhtError::InvalidHash(_) => "invalid geohash",
            GhtError::Duplicate => "duplicate leaf rejected by duplicates policy",
            GhtError::NotFound(_) => "dimension not found",
            GhtError::Schema(_) => "schema error",
            GhtError::Format(_) => "format error",
            GhtError::IoError(_) => "io error",
            GhtError::InvalidHex(_) => "invalid hex input",
            GhtError::Invariant(_) => "internal invariant violated",
        }
    }

    fn cause(&self) -> Option<&dyn Error> {
        match self {
            GhtError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for GhtError {
    fn from(err: io::Error) -> Self {
        GhtError::IoError(err)
    }
}

impl From<GhtError> for io::Error {
    fn from(err: GhtError) -> Self {
        match err {
            GhtError::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, e.to_string()),
        }
    }
}
