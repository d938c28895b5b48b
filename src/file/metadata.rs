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

//! The data model produced by the decoder: `ParquetMetaData`
//! is the top-level, immutable, self-contained result of a successful
//! `parse_metadata` call. Every sequence/map here is owned; none of it
//! references the `ChunkReader` it was read from.

use std::collections::HashMap;

use crate::basic::{Compression, Encoding, Type as PhysicalType};
use crate::file::statistics::Statistics;
use crate::schema::types::{ColumnPath, SchemaDescriptor};

/// The `-1` sentinel this crate uses throughout for "optional integer,
/// absent".
pub const ABSENT: i64 = -1;

/// File-level metadata: everything in the Thrift `FileMetaData` struct
/// except the row groups themselves, which `ParquetMetaData` carries
/// alongside it.
#[derive(Debug, Clone)]
pub struct FileMetaData {
  version: i32,
  num_rows: i64,
  created_by: Option<String>,
  key_value_metadata: HashMap<String, String>,
  schema_descr: SchemaDescriptor,
}

impl FileMetaData {
  pub fn new(
    version: i32,
    num_rows: i64,
    created_by: Option<String>,
    key_value_metadata: HashMap<String, String>,
    schema_descr: SchemaDescriptor,
  ) -> Self {
    FileMetaData {
      version,
      num_rows,
      created_by,
      key_value_metadata,
      schema_descr,
    }
  }

  pub fn version(&self) -> i32 {
    self.version
  }

  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  pub fn created_by(&self) -> Option<&str> {
    self.created_by.as_deref()
  }

  pub fn key_value_metadata(&self) -> &HashMap<String, String> {
    &self.key_value_metadata
  }

  pub fn schema_descr(&self) -> &SchemaDescriptor {
    &self.schema_descr
  }
}

/// One column chunk within a row group (`ColumnChunk` +
/// `ColumnMetaData`, merged since this decoder only ever sees them
/// together).
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
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
  file_path: Option<String>,
  /// Informational only, item 4: recorded but unused by
  /// this decoder.
  file_offset: i64,
}

#[allow(clippy::too_many_arguments)]
impl ColumnChunkMetaData {
  pub fn new(
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
    file_path: Option<String>,
    file_offset: i64,
  ) -> Self {
    ColumnChunkMetaData {
      column_path,
      physical_type,
      encodings,
      codec,
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
      file_path,
      file_offset,
    }
  }

  pub fn column_path(&self) -> &ColumnPath {
    &self.column_path
  }

  /// Dotted name, e.g. `"a.b"`.
  pub fn name(&self) -> String {
    self.column_path.joined()
  }

  pub fn physical_type(&self) -> PhysicalType {
    self.physical_type
  }

  pub fn encodings(&self) -> &[Encoding] {
    &self.encodings
  }

  pub fn compression(&self) -> Compression {
    self.codec
  }

  pub fn num_values(&self) -> i64 {
    self.num_values
  }

  pub fn uncompressed_size(&self) -> i64 {
    self.total_uncompressed_size
  }

  pub fn compressed_size(&self) -> i64 {
    self.total_compressed_size
  }

  pub fn key_value_metadata(&self) -> &HashMap<String, String> {
    &self.key_value_metadata
  }

  pub fn data_page_offset(&self) -> i64 {
    self.data_page_offset
  }

  pub fn index_page_offset(&self) -> i64 {
    self.index_page_offset
  }

  pub fn dictionary_page_offset(&self) -> Option<i64> {
    if self.dictionary_page_offset == ABSENT {
      None
    } else {
      Some(self.dictionary_page_offset)
    }
  }

  pub fn has_dictionary_page(&self) -> bool {
    self.dictionary_page_offset != ABSENT
  }

  pub fn statistics(&self) -> Option<&Statistics> {
    self.statistics.as_ref()
  }

  pub fn bloom_filter_offset(&self) -> Option<i64> {
    if self.bloom_filter_offset == ABSENT {
      None
    } else {
      Some(self.bloom_filter_offset)
    }
  }

  pub fn bloom_filter_length(&self) -> Option<i64> {
    if self.bloom_filter_length == ABSENT {
      None
    } else {
      Some(self.bloom_filter_length)
    }
  }

  pub fn file_path(&self) -> Option<&str> {
    self.file_path.as_deref()
  }

  pub fn file_offset(&self) -> i64 {
    self.file_offset
  }
}

/// One row group: a horizontal partition holding one column chunk per
/// column. The sum of `ColumnChunkMetaData::uncompressed_size`
/// is *not* guaranteed to equal `total_byte_size` — Parquet makes no
/// such promise, and this crate does not assert it.
#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
  columns: Vec<ColumnChunkMetaData>,
  num_rows: i64,
  total_byte_size: i64,
}

impl RowGroupMetaData {
  pub fn new(columns: Vec<ColumnChunkMetaData>, num_rows: i64, total_byte_size: i64) -> Self {
    RowGroupMetaData {
      columns,
      num_rows,
      total_byte_size,
    }
  }

  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  pub fn total_byte_size(&self) -> i64 {
    self.total_byte_size
  }

  pub fn num_columns(&self) -> usize {
    self.columns.len()
  }

  pub fn columns(&self) -> &[ColumnChunkMetaData] {
    &self.columns
  }

  pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
    &self.columns[i]
  }
}

/// The complete, top-level result of `parse_metadata`.
#[derive(Debug, Clone)]
pub struct ParquetMetaData {
  file_metadata: FileMetaData,
  row_groups: Vec<RowGroupMetaData>,
}

impl ParquetMetaData {
  pub fn new(file_metadata: FileMetaData, row_groups: Vec<RowGroupMetaData>) -> Self {
    ParquetMetaData {
      file_metadata,
      row_groups,
    }
  }

  pub fn file_metadata(&self) -> &FileMetaData {
    &self.file_metadata
  }

  pub fn num_row_groups(&self) -> usize {
    self.row_groups.len()
  }

  pub fn row_groups(&self) -> &[RowGroupMetaData] {
    &self.row_groups
  }

  pub fn row_group(&self, i: usize) -> &RowGroupMetaData {
    &self.row_groups[i]
  }
}
