// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Footer location and `FileMetaData` parsing,
//! combined in one module the way `SerializedFileReader::parse_metadata`
//! does it upstream.
//!
//! Layout of a Parquet file:
//! ```text
//! +---------------------------+-----+---+
//! |      Rest of file         |  B  | A |
//! +---------------------------+-----+---+
//! ```
//! where A is the 8-byte trailer (`footer_len` LE u32, then 4-byte
//! magic) and B is the Thrift-encoded `FileMetaData`.

use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::basic::{Compression, ConvertedType, Encoding, Repetition, TimeUnit, Type as PhysicalType};
use crate::errors::{ParquetError, Result};
use crate::file::metadata::{ColumnChunkMetaData, FileMetaData, ParquetMetaData, RowGroupMetaData, ABSENT};
use crate::file::reader::ChunkReader;
use crate::file::statistics::Statistics;
use crate::schema::types::{build_tree, ColumnPath, LogicalType, RawSchemaElement};
use crate::thrift::{CompactProtocolReader, FieldHeader, WireType};

pub const FOOTER_SIZE: u64 = 8;
pub const PARQUET_MAGIC: [u8; 4] = *b"PAR1";
pub const PARQUET_MAGIC_ENCRYPTED: [u8; 4] = *b"PARE";

/// Locates and returns the footer byte slice. Does not
/// itself parse the Thrift payload.
pub fn locate_footer<R: ChunkReader>(source: &R) -> Result<Vec<u8>> {
  let file_size = source.len();
  if file_size < FOOTER_SIZE {
    return Err(ParquetError::TooSmall(file_size));
  }

  let trailer = source.get_bytes(file_size - FOOTER_SIZE, FOOTER_SIZE as usize)?;
  let magic = &trailer[4..8];
  if magic == PARQUET_MAGIC_ENCRYPTED {
    return Err(ParquetError::Encrypted);
  }
  if magic != PARQUET_MAGIC {
    return Err(ParquetError::BadMagic);
  }

  let footer_len = LittleEndian::read_u32(&trailer[0..4]) as u64;
  if footer_len == 0 || footer_len > file_size - FOOTER_SIZE {
    return Err(ParquetError::MalformedEncoding(
      0,
      format!(
        "footer length {} is zero or exceeds available bytes ({})",
        footer_len,
        file_size - FOOTER_SIZE
      ),
    ));
  }

  let footer_start = file_size - FOOTER_SIZE - footer_len;
  source.get_bytes(footer_start, footer_len as usize)
}

/// Locates the footer and parses it into a complete `ParquetMetaData`.
pub fn parse_metadata<R: ChunkReader>(source: &R) -> Result<ParquetMetaData> {
  let footer = locate_footer(source)?;
  parse_file_metadata(&footer)
}

/// Parses a raw `FileMetaData` Thrift struct out of an already-located
/// footer slice.
pub fn parse_file_metadata(footer: &[u8]) -> Result<ParquetMetaData> {
  let mut r = CompactProtocolReader::new(footer);

  let mut version = 0i32;
  let mut schema_elements: Option<Vec<RawSchemaElement>> = None;
  let mut num_rows: Option<i64> = None;
  let mut row_groups_raw: Option<Vec<RowGroupMetaData>> = None;
  let mut key_value_metadata = HashMap::new();
  let mut created_by = None;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wire_type) => {
        last_id = id;
        match id {
          1 => version = r.read_zigzag32()?,
          2 => {
            let (elem_type, size) = r.read_list_header()?;
            if elem_type != WireType::Struct && size != 0 {
              return Err(ParquetError::MalformedEncoding(
                r.offset(),
                "schema list elements are not structs".to_string(),
              ));
            }
            let mut elements = Vec::with_capacity(size);
            for _ in 0..size {
              elements.push(parse_schema_element(&mut r)?);
            }
            schema_elements = Some(elements);
          }
          3 => num_rows = Some(r.read_zigzag64()?),
          4 => {
            let (elem_type, size) = r.read_list_header()?;
            if elem_type != WireType::Struct && size != 0 {
              return Err(ParquetError::MalformedEncoding(
                r.offset(),
                "row_groups list elements are not structs".to_string(),
              ));
            }
            let mut row_groups = Vec::with_capacity(size);
            for _ in 0..size {
              row_groups.push(parse_row_group(&mut r)?);
            }
            row_groups_raw = Some(row_groups);
          }
          5 => {
            let (elem_type, size) = r.read_list_header()?;
            if elem_type != WireType::Struct && size != 0 {
              return Err(ParquetError::MalformedEncoding(
                r.offset(),
                "key_value_metadata list elements are not structs".to_string(),
              ));
            }
            for _ in 0..size {
              let (k, v) = parse_key_value(&mut r)?;
              key_value_metadata.insert(k, v.unwrap_or_default());
            }
          }
          6 => created_by = Some(r.read_string()?),
          _ => {
            log::debug!("skipping unknown FileMetaData field id {}", id);
            r.skip_field(wire_type)?;
          }
        }
      }
    }
  }

  let schema_elements = schema_elements.ok_or(ParquetError::MissingRequiredField("schema"))?;
  let num_rows = num_rows.ok_or(ParquetError::MissingRequiredField("num_rows"))?;
  let row_groups_raw = row_groups_raw.ok_or(ParquetError::MissingRequiredField("row_groups"))?;

  let (_root, schema_descr) = build_tree(&schema_elements)?;

  let file_metadata = FileMetaData::new(version, num_rows, created_by, key_value_metadata, schema_descr);
  Ok(ParquetMetaData::new(file_metadata, row_groups_raw))
}

fn parse_key_value(r: &mut CompactProtocolReader) -> Result<(String, Option<String>)> {
  let mut key = None;
  let mut value = None;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => key = Some(r.read_string()?),
          2 => value = Some(r.read_string()?),
          _ => r.skip_field(wt)?,
        }
      }
    }
  }
  Ok((key.ok_or(ParquetError::MissingRequiredField("key"))?, value))
}

/// Parses one `SchemaElement` struct.
fn parse_schema_element(r: &mut CompactProtocolReader) -> Result<RawSchemaElement> {
  let mut physical_type = None;
  let mut type_length = None;
  let mut repetition = None;
  let mut name = None;
  let mut num_children = None;
  let mut converted_type = None;
  let mut scale = None;
  let mut precision = None;
  let mut field_id = None;
  let mut logical_type = None;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => physical_type = PhysicalType::from_i32(r.read_zigzag32()?),
          2 => type_length = Some(r.read_zigzag32()?),
          3 => repetition = Repetition::from_i32(r.read_zigzag32()?),
          4 => name = Some(r.read_string()?),
          5 => num_children = Some(r.read_zigzag32()?),
          6 => converted_type = ConvertedType::from_i32(r.read_zigzag32()?),
          7 => scale = Some(r.read_zigzag32()?),
          8 => precision = Some(r.read_zigzag32()?),
          9 => field_id = Some(r.read_zigzag32()?),
          10 => logical_type = Some(parse_logical_type(r)?),
          _ => {
            log::debug!("skipping unknown SchemaElement field id {}", id);
            r.skip_field(wt)?;
          }
        }
      }
    }
  }

  Ok(RawSchemaElement {
    physical_type,
    type_length,
    repetition,
    name: name.ok_or(ParquetError::MissingRequiredField("SchemaElement.name"))?,
    num_children,
    converted_type,
    scale,
    precision,
    field_id,
    logical_type,
  })
}

/// Parses the `LogicalType` tagged union.
/// Picks the first present field, as the spec instructs.
fn parse_logical_type(r: &mut CompactProtocolReader) -> Result<LogicalType> {
  let mut result = None;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        if result.is_some() {
          r.skip_field(wt)?;
          continue;
        }
        result = Some(match id {
          1 => {
            skip_empty_struct(r, wt)?;
            LogicalType::STRING
          }
          2 => {
            skip_empty_struct(r, wt)?;
            LogicalType::MAP
          }
          3 => {
            skip_empty_struct(r, wt)?;
            LogicalType::LIST
          }
          4 => {
            skip_empty_struct(r, wt)?;
            LogicalType::ENUM
          }
          5 => parse_decimal_type(r)?,
          6 => {
            skip_empty_struct(r, wt)?;
            LogicalType::DATE
          }
          7 => parse_time_type(r)?,
          8 => parse_time_type_as_timestamp(r)?,
          9 => parse_int_type(r)?,
          10 => {
            skip_empty_struct(r, wt)?;
            LogicalType::JSON
          }
          11 => {
            skip_empty_struct(r, wt)?;
            LogicalType::BSON
          }
          12 => {
            skip_empty_struct(r, wt)?;
            LogicalType::UUID
          }
          13 => {
            skip_empty_struct(r, wt)?;
            LogicalType::FLOAT16
          }
          _ => {
            log::debug!("skipping unknown LogicalType tag {}", id);
            r.skip_field(wt)?;
            LogicalType::UNKNOWN
          }
        });
      }
    }
  }
  Ok(result.unwrap_or(LogicalType::UNKNOWN))
}

fn skip_empty_struct(r: &mut CompactProtocolReader, wt: WireType) -> Result<()> {
  r.skip_field(wt)
}

fn parse_decimal_type(r: &mut CompactProtocolReader) -> Result<LogicalType> {
  let mut scale = 0i32;
  let mut precision = 0i32;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => scale = r.read_zigzag32()?,
          2 => precision = r.read_zigzag32()?,
          _ => r.skip_field(wt)?,
        }
      }
    }
  }
  Ok(LogicalType::DECIMAL { precision, scale })
}

fn parse_time_unit(r: &mut CompactProtocolReader) -> Result<TimeUnit> {
  // TimeUnit is itself a union: {1: MILLIS, 2: MICROS, 3: NANOS}, each
  // an empty struct.
  let mut last_id = 0i16;
  let mut unit = TimeUnit::MILLIS;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        r.skip_field(wt)?;
        unit = match id {
          1 => TimeUnit::MILLIS,
          2 => TimeUnit::MICROS,
          3 => TimeUnit::NANOS,
          _ => unit,
        };
      }
    }
  }
  Ok(unit)
}

fn parse_time_type(r: &mut CompactProtocolReader) -> Result<LogicalType> {
  let mut is_utc = false;
  let mut unit = TimeUnit::MILLIS;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => is_utc = read_bool(r, wt)?,
          2 => unit = parse_time_unit(r)?,
          _ => r.skip_field(wt)?,
        }
      }
    }
  }
  Ok(LogicalType::TIME { unit, is_utc })
}

fn parse_time_type_as_timestamp(r: &mut CompactProtocolReader) -> Result<LogicalType> {
  let mut is_utc = false;
  let mut unit = TimeUnit::MILLIS;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => is_utc = read_bool(r, wt)?,
          2 => unit = parse_time_unit(r)?,
          _ => r.skip_field(wt)?,
        }
      }
    }
  }
  Ok(LogicalType::TIMESTAMP { unit, is_utc })
}

fn parse_int_type(r: &mut CompactProtocolReader) -> Result<LogicalType> {
  let mut bit_width = 0i8;
  let mut signed = false;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => bit_width = read_i8(r, wt)?,
          2 => signed = read_bool(r, wt)?,
          _ => r.skip_field(wt)?,
        }
      }
    }
  }
  Ok(LogicalType::INT { bit_width, signed })
}

/// Compact protocol encodes `bool` fields directly in the field header
/// wire type (`BoolTrue`/`BoolFalse`), so there is no payload to read.
fn read_bool(_r: &mut CompactProtocolReader, wt: WireType) -> Result<bool> {
  Ok(wt == WireType::BoolTrue)
}

/// `IntType.bitWidth` is a raw Compact Protocol `I8`: one unencoded
/// byte, not a zig-zag varint.
fn read_i8(r: &mut CompactProtocolReader, _wt: WireType) -> Result<i8> {
  r.read_i8()
}

/// Parses one `RowGroup` struct.
fn parse_row_group(r: &mut CompactProtocolReader) -> Result<RowGroupMetaData> {
  let mut columns = None;
  let mut total_byte_size = None;
  let mut num_rows = None;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => {
            let (elem_type, size) = r.read_list_header()?;
            if elem_type != WireType::Struct && size != 0 {
              return Err(ParquetError::MalformedEncoding(
                r.offset(),
                "RowGroup.columns elements are not structs".to_string(),
              ));
            }
            let mut cols = Vec::with_capacity(size);
            for _ in 0..size {
              cols.push(parse_column_chunk(r)?);
            }
            columns = Some(cols);
          }
          2 => total_byte_size = Some(r.read_zigzag64()?),
          3 => num_rows = Some(r.read_zigzag64()?),
          _ => {
            log::debug!("skipping unknown RowGroup field id {}", id);
            r.skip_field(wt)?;
          }
        }
      }
    }
  }

  Ok(RowGroupMetaData::new(
    columns.ok_or(ParquetError::MissingRequiredField("RowGroup.columns"))?,
    num_rows.ok_or(ParquetError::MissingRequiredField("RowGroup.num_rows"))?,
    total_byte_size.ok_or(ParquetError::MissingRequiredField("RowGroup.total_byte_size"))?,
  ))
}

/// Parses one `ColumnChunk` struct, inlining its `meta_data`
/// (`ColumnMetaData`) fields.
fn parse_column_chunk(r: &mut CompactProtocolReader) -> Result<ColumnChunkMetaData> {
  let mut file_path = None;
  let mut file_offset = 0i64;
  let mut meta = None;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => file_path = Some(r.read_string()?),
          2 => file_offset = r.read_zigzag64()?,
          3 => meta = Some(parse_column_metadata(r)?),
          _ => {
            log::debug!("skipping unknown ColumnChunk field id {}", id);
            r.skip_field(wt)?;
          }
        }
      }
    }
  }

  let meta = meta.ok_or(ParquetError::MissingRequiredField("ColumnChunk.meta_data"))?;
  Ok(ColumnChunkMetaData::new(
    meta.column_path,
    meta.physical_type,
    meta.encodings,
    meta.codec,
    meta.num_values,
    meta.total_uncompressed_size,
    meta.total_compressed_size,
    meta.key_value_metadata,
    meta.data_page_offset,
    meta.index_page_offset,
    meta.dictionary_page_offset,
    meta.statistics,
    meta.bloom_filter_offset,
    meta.bloom_filter_length,
    file_path,
    file_offset,
  ))
}

/// Intermediate holder for `ColumnMetaData`'s fields before they are
/// folded into the sibling `ColumnChunk`'s `file_path`/`file_offset`.
struct RawColumnMetaData {
  column_path: ColumnPath,
  physical_type: PhysicalType,
  encodings: Vec<Encoding>,
  codec: Compression,
  num_values: i64,
  total_uncompressed_size: i64,
  total_compressed_size: i64,
  key_value_metadata: HashMap<String, String>,
  data_page_offset: i64,
  index_page_offset: i64,
  dictionary_page_offset: i64,
  statistics: Option<Statistics>,
  bloom_filter_offset: i64,
  bloom_filter_length: i64,
}

fn parse_column_metadata(r: &mut CompactProtocolReader) -> Result<RawColumnMetaData> {
  let mut physical_type = None;
  let mut encodings = Vec::new();
  let mut path_in_schema = None;
  let mut codec = None;
  let mut num_values = 0i64;
  let mut total_uncompressed_size = 0i64;
  let mut total_compressed_size = 0i64;
  let mut key_value_metadata = HashMap::new();
  let mut data_page_offset = ABSENT;
  let mut index_page_offset = ABSENT;
  let mut dictionary_page_offset = ABSENT;
  let mut statistics = None;
  let mut bloom_filter_offset = ABSENT;
  let mut bloom_filter_length = ABSENT;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => physical_type = PhysicalType::from_i32(r.read_zigzag32()?),
          2 => {
            let (elem_type, size) = r.read_list_header()?;
            let mut values = Vec::with_capacity(size);
            for _ in 0..size {
              match elem_type {
                WireType::I32 | WireType::I16 => values.push(r.read_zigzag32()?),
                _ => return Err(ParquetError::MalformedEncoding(r.offset(), "bad encodings list element type".to_string())),
              }
            }
            encodings = values.into_iter().map(Encoding::from_i32).collect();
          }
          3 => {
            let (elem_type, size) = r.read_list_header()?;
            let mut parts = Vec::with_capacity(size);
            for _ in 0..size {
              match elem_type {
                WireType::Binary => parts.push(r.read_string()?),
                _ => return Err(ParquetError::MalformedEncoding(r.offset(), "bad path_in_schema list element type".to_string())),
              }
            }
            path_in_schema = Some(parts);
          }
          4 => codec = Some(Compression::from_i32(r.read_zigzag32()?)),
          5 => num_values = r.read_zigzag64()?,
          6 => total_uncompressed_size = r.read_zigzag64()?,
          7 => total_compressed_size = r.read_zigzag64()?,
          8 => {
            let (elem_type, size) = r.read_list_header()?;
            if elem_type != WireType::Struct && size != 0 {
              return Err(ParquetError::MalformedEncoding(r.offset(), "bad key_value_metadata list".to_string()));
            }
            for _ in 0..size {
              let (k, v) = parse_key_value(r)?;
              key_value_metadata.insert(k, v.unwrap_or_default());
            }
          }
          9 => data_page_offset = r.read_zigzag64()?,
          10 => index_page_offset = r.read_zigzag64()?,
          11 => dictionary_page_offset = r.read_zigzag64()?,
          12 => statistics = Some(parse_statistics(r)?),
          13 => {
            log::debug!("skipping ColumnMetaData.encoding_stats (field 13)");
            r.skip_field(wt)?;
          }
          14 => bloom_filter_offset = r.read_zigzag64()?,
          15 => bloom_filter_length = r.read_zigzag64()?,
          _ => {
            log::debug!("skipping unknown ColumnMetaData field id {}", id);
            r.skip_field(wt)?;
          }
        }
      }
    }
  }

  Ok(RawColumnMetaData {
    column_path: ColumnPath::new(path_in_schema.ok_or(ParquetError::MissingRequiredField("ColumnMetaData.path_in_schema"))?),
    physical_type: physical_type.ok_or(ParquetError::MissingRequiredField("ColumnMetaData.type"))?,
    encodings,
    codec: codec.ok_or(ParquetError::MissingRequiredField("ColumnMetaData.codec"))?,
    num_values,
    total_uncompressed_size,
    total_compressed_size,
    key_value_metadata,
    data_page_offset,
    index_page_offset,
    dictionary_page_offset,
    statistics,
    bloom_filter_offset,
    bloom_filter_length,
  })
}

/// Parses a `Statistics` struct, applying the v1/v2 precedence rule
///: `min_value`/`max_value` (fields 6/5) win over the
/// legacy `min`/`max` (fields 2/1) when both are present.
fn parse_statistics(r: &mut CompactProtocolReader) -> Result<Statistics> {
  let mut legacy_min = None;
  let mut legacy_max = None;
  let mut v2_min = None;
  let mut v2_max = None;
  let mut null_count = ABSENT;
  let mut distinct_count = ABSENT;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => legacy_max = Some(r.read_binary()?),
          2 => legacy_min = Some(r.read_binary()?),
          3 => null_count = r.read_zigzag64()?,
          4 => distinct_count = r.read_zigzag64()?,
          5 => v2_max = Some(r.read_binary()?),
          6 => v2_min = Some(r.read_binary()?),
          _ => r.skip_field(wt)?,
        }
      }
    }
  }

  Ok(Statistics {
    min: v2_min.or(legacy_min),
    max: v2_max.or(legacy_max),
    null_count,
    distinct_count,
  })
}
