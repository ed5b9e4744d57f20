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
//! # geocloud
//! Typed dimensions, schemas and packed attribute values shared by every
//! point in a tree.

#![allow(dead_code)]
#![warn(missing_docs)]

#[macro_use]
extern crate serde;

pub mod types;
pub use types::Type;

pub mod dimension;
pub use dimension::Dimension;

pub mod schema;
pub use schema::Schema;

pub mod attribute;
pub use attribute::Attribute;

pub mod xml;
pub use xml::{schema_from_xml_str, schema_to_xml_str};

pub mod errors;
pub use errors::{GhtError, GhtResult};
