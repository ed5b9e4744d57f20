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

//! The `<pc:PointCloudSchema>` XML interface. This is an external
//! collaborator touched only through these two entry points; the XML
//! dialect itself is not otherwise exposed.
use crate::dimension::Dimension;
use crate::schema::Schema;
use crate::types::Type;
use core_ght::{GhtError, GhtResult};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

struct PendingDimension {
    position: Option<u8>,
    name: Option<String>,
    description: String,
    interpretation: Option<String>,
    scale: f64,
    offset: f64,
    active: bool,
}

impl PendingDimension {
    fn fresh() -> PendingDimension {
        PendingDimension {
            position: None,
            name: None,
            description: String::new(),
            interpretation: None,
            scale: 1.0,
            offset: 0.0,
            active: true,
        }
    }

    /// `schema_index` becomes the built dimension's `position`, i.e. its
    /// slot in the resulting `Schema` — NOT the document's `<pc:position>`
    /// value. The XML dialect's `position` and a schema's dimension index
    /// are different concepts (compare the source format's own distinction
    /// between a dimension's position and its index): `<pc:position>` is
    /// free-form metadata that need not be 0-based, contiguous, or even
    /// unique, while `Dimension::position` doubles as the index
    /// `Attribute::dim_position` and the binary serializer key off of, and
    /// so must match the dimension's actual place in the schema.
    fn finish(self, schema_index: u8) -> GhtResult<Option<Dimension>> {
        if !self.active {
            log::warn!("schema_from_xml: dimension {:?} is inactive, skipping", self.name);
            return Ok(None);
        }
        self.position
            .ok_or_else(|| GhtError::Format("<pc:dimension> missing <pc:position>".into()))?;
        let name = self
            .name
            .ok_or_else(|| GhtError::Format("<pc:dimension> missing <pc:name>".into()))?;
        let interpretation = self
            .interpretation
            .ok_or_else(|| GhtError::Format("<pc:dimension> missing <pc:interpretation>".into()))?;
        let dtype = Type::from_interpretation(&interpretation)?;
        Ok(Some(Dimension::new(schema_index, name, self.description, dtype, self.scale, self.offset)))
    }
}

/// Parses a `<pc:PointCloudSchema>` document into a [`Schema`].
///
/// `<pc:scale>`/`<pc:offset>` default to `1`/`0` when absent; `<pc:active>`
/// defaults to `true`, and dimensions with `<pc:active>false</pc:active>`
/// are dropped (logged as a warning) rather than included. Each surviving
/// dimension's schema position is assigned by its order in the document,
/// not by its `<pc:position>` text, which is read only to confirm the
/// element is present.
pub fn schema_from_xml_str(xml: &str) -> GhtResult<Schema> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut dims = Vec::new();
    let mut next_index: u8 = 0;
    let mut current: Option<PendingDimension> = None;
    let mut field_path: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| GhtError::Format(format!("xml parse error: {}", e)))?
        {
            Event::Start(e) => {
                let local = local_name(&e);
                if local == "dimension" {
                    current = Some(PendingDimension::fresh());
                } else {
                    field_path.push(local);
                }
            }
            Event::Text(t) => {
                if let (Some(dim), Some(field)) = (current.as_mut(), field_path.last()) {
                    let text = decode_text(&t)?;
                    apply_field(dim, field, &text)?;
                }
            }
            Event::End(e) => {
                let local = local_name_end(&e);
                if local == "dimension" {
                    if let Some(dim) = current.take() {
                        if let Some(built) = dim.finish(next_index)? {
                            next_index += 1;
                            dims.push(built);
                        }
                    }
                } else {
                    field_path.pop();
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if dims.is_empty() {
        return Err(GhtError::Format("schema XML contained no active dimensions".into()));
    }
    Schema::new(dims)
}

fn local_name(e: &BytesStart) -> String {
    strip_prefix(e.name().as_ref())
}

fn local_name_end(e: &quick_xml::events::BytesEnd) -> String {
    strip_prefix(e.name().as_ref())
}

fn strip_prefix(qualified: &[u8]) -> String {
    let s = String::from_utf8_lossy(qualified);
    match s.split_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.to_string(),
    }
}

fn decode_text(t: &BytesText) -> GhtResult<String> {
    t.unescape()
        .map(|c| c.into_owned())
        .map_err(|e| GhtError::Format(format!("xml text decode error: {}", e)))
}

fn apply_field(dim: &mut PendingDimension, field: &str, text: &str) -> GhtResult<()> {
    match field {
        "position" => {
            dim.position = Some(
                text.trim()
                    .parse()
                    .map_err(|_| GhtError::Format(format!("invalid <pc:position> {:?}", text)))?,
            )
        }
        "name" => dim.name = Some(text.to_string()),
        "description" => dim.description = text.to_string(),
        "interpretation" => dim.interpretation = Some(text.to_string()),
        "scale" => {
            dim.scale = text
                .trim()
                .parse()
                .map_err(|_| GhtError::Format(format!("invalid <pc:scale> {:?}", text)))?
        }
        "offset" => {
            dim.offset = text
                .trim()
                .parse()
                .map_err(|_| GhtError::Format(format!("invalid <pc:offset> {:?}", text)))?
        }
        "active" => dim.active = text.trim() == "true" || text.trim() == "1",
        _ => {}
    }
    Ok(())
}

/// Emits a `<pc:PointCloudSchema>` document structurally equivalent to the
/// one [`schema_from_xml_str`] would parse back into this schema.
pub fn schema_to_xml_str(schema: &Schema) -> GhtResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Start(BytesStart::new("pc:PointCloudSchema")))
        .map_err(xml_write_err)?;
    for dim in schema.dimensions() {
        write_dimension(&mut writer, dim)?;
    }
    writer
        .write_event(Event::End(quick_xml::events::BytesEnd::new("pc:PointCloudSchema")))
        .map_err(xml_write_err)?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| GhtError::Format(format!("non-utf8 xml output: {}", e)))
}

fn xml_write_err(e: impl std::fmt::Display) -> GhtError {
    GhtError::Format(format!("xml write error: {}", e))
}

fn write_dimension(writer: &mut Writer<Cursor<Vec<u8>>>, dim: &Dimension) -> GhtResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new("pc:dimension")))
        .map_err(xml_write_err)?;
    write_text_element(writer, "pc:position", &dim.position.to_string())?;
    write_text_element(writer, "pc:name", &dim.name)?;
    write_text_element(writer, "pc:description", &dim.description)?;
    write_text_element(writer, "pc:interpretation", dim.dtype.interpretation())?;
    write_text_element(writer, "pc:scale", &dim.scale.to_string())?;
    write_text_element(writer, "pc:offset", &dim.offset.to_string())?;
    write_text_element(writer, "pc:active", "true")?;
    writer
        .write_event(Event::End(quick_xml::events::BytesEnd::new("pc:dimension")))
        .map_err(xml_write_err)?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> GhtResult<()> {
    writer.write_event(Event::Start(BytesStart::new(tag))).map_err(xml_write_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_write_err)?;
    writer
        .write_event(Event::End(quick_xml::events::BytesEnd::new(tag)))
        .map_err(xml_write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<pc:PointCloudSchema xmlns:pc="http://pointcloud.org/schemas/PC/1.1">
  <pc:dimension>
    <pc:position>1</pc:position>
    <pc:name>X</pc:name>
    <pc:description>x coordinate</pc:description>
    <pc:interpretation>double</pc:interpretation>
  </pc:dimension>
  <pc:dimension>
    <pc:position>2</pc:position>
    <pc:name>Y</pc:name>
    <pc:description>y coordinate</pc:description>
    <pc:interpretation>double</pc:interpretation>
  </pc:dimension>
  <pc:dimension>
    <pc:position>3</pc:position>
    <pc:name>Intensity</pc:name>
    <pc:description>return intensity</pc:description>
    <pc:interpretation>uint16_t</pc:interpretation>
    <pc:scale>0.01</pc:scale>
    <pc:offset>0</pc:offset>
  </pc:dimension>
  <pc:dimension>
    <pc:position>4</pc:position>
    <pc:name>Deprecated</pc:name>
    <pc:description>unused</pc:description>
    <pc:interpretation>int8_t</pc:interpretation>
    <pc:active>false</pc:active>
  </pc:dimension>
</pc:PointCloudSchema>"#;

    #[test]
    fn parses_dimensions_and_skips_inactive() {
        let schema = schema_from_xml_str(DOC).unwrap();
        assert_eq!(schema.len(), 3);
        let intensity = schema.dimension_by_name("Intensity").unwrap();
        assert_eq!(intensity.scale, 0.01);
        assert!(schema.dimension_by_name("Deprecated").is_err());
    }

    #[test]
    fn round_trips_through_to_xml() {
        let schema = schema_from_xml_str(DOC).unwrap();
        let xml = schema_to_xml_str(&schema).unwrap();
        let reparsed = schema_from_xml_str(&xml).unwrap();
        assert!(schema.same(&reparsed));
    }

    #[test]
    fn missing_interpretation_is_format_error() {
        let bad = r#"<pc:PointCloudSchema>
          <pc:dimension><pc:position>1</pc:position><pc:name>X</pc:name></pc:dimension>
          <pc:dimension><pc:position>2</pc:position><pc:name>Y</pc:name><pc:interpretation>double</pc:interpretation></pc:dimension>
        </pc:PointCloudSchema>"#;
        assert!(schema_from_xml_str(bad).is_err());
    }
}
