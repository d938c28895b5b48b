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

//! The small, closed enumerations that appear throughout Parquet metadata:
//! physical storage type, repetition, encodings, compression codecs, and
//! the legacy "converted type". Unknown integer codes are preserved as
//! `UNKNOWN` rather than rejected, per spec.

use std::fmt;

/// Physical (on-disk) storage type of a primitive schema leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
  BOOLEAN,
  INT32,
  INT64,
  INT96,
  FLOAT,
  DOUBLE,
  BYTE_ARRAY,
  FIXED_LEN_BYTE_ARRAY,
}

impl Type {
  pub fn from_i32(value: i32) -> Option<Type> {
    match value {
      0 => Some(Type::BOOLEAN),
      1 => Some(Type::INT32),
      2 => Some(Type::INT64),
      3 => Some(Type::INT96),
      4 => Some(Type::FLOAT),
      5 => Some(Type::DOUBLE),
      6 => Some(Type::BYTE_ARRAY),
      7 => Some(Type::FIXED_LEN_BYTE_ARRAY),
      _ => None,
    }
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// Repetition of a schema element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
  REQUIRED,
  OPTIONAL,
  REPEATED,
}

impl Repetition {
  pub fn from_i32(value: i32) -> Option<Repetition> {
    match value {
      0 => Some(Repetition::REQUIRED),
      1 => Some(Repetition::OPTIONAL),
      2 => Some(Repetition::REPEATED),
      _ => None,
    }
  }
}

/// Page/value encoding, widened with an `UNKNOWN(code)` catch-all so an
/// unrecognized code never aborts the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
  PLAIN,
  PLAIN_DICTIONARY,
  RLE,
  BIT_PACKED,
  DELTA_BINARY_PACKED,
  DELTA_LENGTH_BYTE_ARRAY,
  DELTA_BYTE_ARRAY,
  RLE_DICTIONARY,
  BYTE_STREAM_SPLIT,
  UNKNOWN(i32),
}

impl Encoding {
  pub fn from_i32(value: i32) -> Encoding {
    match value {
      0 => Encoding::PLAIN,
      2 => Encoding::PLAIN_DICTIONARY,
      3 => Encoding::RLE,
      4 => Encoding::BIT_PACKED,
      5 => Encoding::DELTA_BINARY_PACKED,
      6 => Encoding::DELTA_LENGTH_BYTE_ARRAY,
      7 => Encoding::DELTA_BYTE_ARRAY,
      8 => Encoding::RLE_DICTIONARY,
      9 => Encoding::BYTE_STREAM_SPLIT,
      other => Encoding::UNKNOWN(other),
    }
  }
}

/// Compression codec, again `UNKNOWN(code)` for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
  UNCOMPRESSED,
  SNAPPY,
  GZIP,
  LZO,
  BROTLI,
  LZ4,
  ZSTD,
  LZ4_RAW,
  UNKNOWN(i32),
}

impl Compression {
  pub fn from_i32(value: i32) -> Compression {
    match value {
      0 => Compression::UNCOMPRESSED,
      1 => Compression::SNAPPY,
      2 => Compression::GZIP,
      3 => Compression::LZO,
      4 => Compression::BROTLI,
      5 => Compression::LZ4,
      6 => Compression::ZSTD,
      7 => Compression::LZ4_RAW,
      other => Compression::UNKNOWN(other),
    }
  }
}

/// Legacy ("converted") logical type, superseded by `LogicalType` but
/// still written by older writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertedType {
  UTF8,
  MAP,
  MAP_KEY_VALUE,
  LIST,
  ENUM,
  DECIMAL,
  DATE,
  TIME_MILLIS,
  TIME_MICROS,
  TIMESTAMP_MILLIS,
  TIMESTAMP_MICROS,
  UINT_8,
  UINT_16,
  UINT_32,
  UINT_64,
  INT_8,
  INT_16,
  INT_32,
  INT_64,
  JSON,
  BSON,
  INTERVAL,
}

impl ConvertedType {
  pub fn from_i32(value: i32) -> Option<ConvertedType> {
    use self::ConvertedType::*;
    let ty = match value {
      0 => UTF8,
      1 => MAP,
      2 => MAP_KEY_VALUE,
      3 => LIST,
      4 => ENUM,
      5 => DECIMAL,
      6 => DATE,
      7 => TIME_MILLIS,
      8 => TIME_MICROS,
      9 => TIMESTAMP_MILLIS,
      10 => TIMESTAMP_MICROS,
      11 => UINT_8,
      12 => UINT_16,
      13 => UINT_32,
      14 => UINT_64,
      15 => INT_8,
      16 => INT_16,
      17 => INT_32,
      18 => INT_64,
      19 => JSON,
      20 => BSON,
      21 => INTERVAL,
      _ => return None,
    };
    Some(ty)
  }
}

/// A TIME/TIMESTAMP logical type's time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
  MILLIS,
  MICROS,
  NANOS,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn physical_type_round_trips() {
    for code in 0..8 {
      assert!(Type::from_i32(code).is_some());
    }
    assert!(Type::from_i32(8).is_none());
  }

  #[test]
  fn unknown_encoding_preserved() {
    match Encoding::from_i32(42) {
      Encoding::UNKNOWN(42) => {}
      other => panic!("expected UNKNOWN(42), got {:?}", other),
    }
  }

  #[test]
  fn unknown_compression_preserved() {
    match Compression::from_i32(99) {
      Compression::UNKNOWN(99) => {}
      other => panic!("expected UNKNOWN(99), got {:?}", other),
    }
  }

  #[test]
  fn converted_type_boundaries() {
    assert_eq!(ConvertedType::from_i32(0), Some(ConvertedType::UTF8));
    assert_eq!(ConvertedType::from_i32(21), Some(ConvertedType::INTERVAL));
    assert_eq!(ConvertedType::from_i32(22), None);
  }
}
