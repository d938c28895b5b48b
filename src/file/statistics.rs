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

//! Typed interpretation of the raw min/max byte strings Parquet carries
//! in `Statistics`. A length mismatch is never fatal: the
//! raw bytes are returned unchanged rather than failing the whole
//! decode, since a writer emitting statistics Parquet readers can't
//! parse must not take down metadata decoding entirely.

use byteorder::{ByteOrder, LittleEndian};

use crate::basic::Type as PhysicalType;

/// Days between the Julian epoch and the Unix epoch, used to convert
/// an INT96 Julian day number to days-since-1970.
const JULIAN_DAY_OF_UNIX_EPOCH: i64 = 2_440_588;

/// Raw min/max bytes decoded into a native value, where the physical
/// type and byte length agree; otherwise the original bytes untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
  Boolean(bool),
  Int32(i32),
  Int64(i64),
  Int96 { days_since_epoch: i64, nanos_of_day: u64 },
  Float(f32),
  Double(f64),
  Bytes(Vec<u8>),
}

/// File-level statistics for one column chunk.
/// `null_count`/`distinct_count` use `-1` as the "absent" sentinel, and
/// `min`/`max` preserve an explicit empty byte string as a legitimate
/// value distinct from `None`.
#[derive(Debug, Clone)]
pub struct Statistics {
  pub min: Option<Vec<u8>>,
  pub max: Option<Vec<u8>>,
  pub null_count: i64,
  pub distinct_count: i64,
}

impl Default for Statistics {
  fn default() -> Self {
    Statistics {
      min: None,
      max: None,
      null_count: -1,
      distinct_count: -1,
    }
  }
}

impl Statistics {
  pub fn new() -> Self {
    Statistics::default()
  }

  pub fn min_decoded(&self, physical_type: PhysicalType) -> Option<TypedValue> {
    self.min.as_deref().map(|b| decode_stat(b, physical_type))
  }

  pub fn max_decoded(&self, physical_type: PhysicalType) -> Option<TypedValue> {
    self.max.as_deref().map(|b| decode_stat(b, physical_type))
  }
}

/// Decodes raw statistics bytes Any length mismatch for
/// the fixed-width physical types falls back to `TypedValue::Bytes`
/// rather than failing.
pub fn decode_stat(bytes: &[u8], physical_type: PhysicalType) -> TypedValue {
  match physical_type {
    PhysicalType::BOOLEAN if bytes.len() == 1 => TypedValue::Boolean(bytes[0] != 0),
    PhysicalType::INT32 if bytes.len() == 4 => TypedValue::Int32(LittleEndian::read_i32(bytes)),
    PhysicalType::INT64 if bytes.len() == 8 => TypedValue::Int64(LittleEndian::read_i64(bytes)),
    PhysicalType::FLOAT if bytes.len() == 4 => TypedValue::Float(LittleEndian::read_f32(bytes)),
    PhysicalType::DOUBLE if bytes.len() == 8 => TypedValue::Double(LittleEndian::read_f64(bytes)),
    PhysicalType::INT96 if bytes.len() == 12 => {
      let nanos_of_day = LittleEndian::read_u64(&bytes[0..8]);
      let julian_day = LittleEndian::read_u32(&bytes[8..12]) as i64;
      TypedValue::Int96 {
        days_since_epoch: julian_day - JULIAN_DAY_OF_UNIX_EPOCH,
        nanos_of_day,
      }
    }
    // BYTE_ARRAY / FIXED_LEN_BYTE_ARRAY, and any length mismatch above.
    _ => TypedValue::Bytes(bytes.to_vec()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn int32_little_endian() {
    let bytes = 5i32.to_le_bytes();
    assert_eq!(decode_stat(&bytes, PhysicalType::INT32), TypedValue::Int32(5));
  }

  #[test]
  fn int96_timestamp_epoch_midnight() {
    let mut bytes = [0u8; 12];
    bytes[8..12].copy_from_slice(&(JULIAN_DAY_OF_UNIX_EPOCH as u32).to_le_bytes());
    match decode_stat(&bytes, PhysicalType::INT96) {
      TypedValue::Int96 { days_since_epoch, nanos_of_day } => {
        assert_eq!(days_since_epoch, 0);
        assert_eq!(nanos_of_day, 0);
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn length_mismatch_falls_back_to_raw_bytes() {
    let bytes = [1u8, 2, 3];
    match decode_stat(&bytes, PhysicalType::INT32) {
      TypedValue::Bytes(b) => assert_eq!(b, vec![1, 2, 3]),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn empty_min_is_preserved_not_absent() {
    let stats = Statistics {
      min: Some(vec![]),
      max: None,
      null_count: -1,
      distinct_count: -1,
    };
    assert!(stats.min.is_some());
    assert_eq!(stats.min.as_ref().unwrap().len(), 0);
  }

  #[test]
  fn byte_array_is_raw() {
    let bytes = b"hello";
    match decode_stat(bytes, PhysicalType::BYTE_ARRAY) {
      TypedValue::Bytes(b) => assert_eq!(b, b"hello"),
      other => panic!("unexpected {:?}", other),
    }
  }
}
