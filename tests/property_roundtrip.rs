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

//! Property tests for the varint/zig-zag round trip and the "never
//! panics on arbitrary bytes" guarantee of the Compact Protocol reader.
//! These exercise `parquet_footer::thrift` directly; the crate exposes
//! it as `pub mod thrift` precisely so these black-box tests can reach
//! it without a test-only feature flag.

use parquet_footer::thrift::{CompactProtocolReader, FieldHeader};
use proptest::prelude::*;

fn write_varint(buf: &mut Vec<u8>, mut v: u64) {
  loop {
    let mut byte = (v & 0x7F) as u8;
    v >>= 7;
    if v != 0 {
      byte |= 0x80;
    }
    buf.push(byte);
    if v == 0 {
      break;
    }
  }
}

fn zigzag_encode64(v: i64) -> u64 {
  ((v << 1) ^ (v >> 63)) as u64
}

proptest! {
  #[test]
  fn varint_round_trips_for_any_u64(v: u64) {
    let mut buf = Vec::new();
    write_varint(&mut buf, v);
    let mut r = CompactProtocolReader::new(&buf);
    prop_assert_eq!(r.read_varint().unwrap(), v);
    prop_assert_eq!(r.offset(), buf.len());
  }

  #[test]
  fn zigzag64_round_trips_for_any_i64(v: i64) {
    let mut buf = Vec::new();
    write_varint(&mut buf, zigzag_encode64(v));
    let mut r = CompactProtocolReader::new(&buf);
    prop_assert_eq!(r.read_zigzag64().unwrap(), v);
  }

  #[test]
  fn binary_round_trips_for_any_byte_string(bytes: Vec<u8>) {
    let mut buf = Vec::new();
    write_varint(&mut buf, bytes.len() as u64);
    buf.extend_from_slice(&bytes);
    let mut r = CompactProtocolReader::new(&buf);
    prop_assert_eq!(r.read_binary().unwrap(), bytes);
  }

  /// No sequence of bytes, however malformed, causes a panic while
  /// walking field headers and skipping unknown values — every failure
  /// mode must come back as `Err`, never `panic!`/index-out-of-bounds.
  #[test]
  fn reader_never_panics_on_arbitrary_bytes(bytes: Vec<u8>) {
    let mut r = CompactProtocolReader::new(&bytes);
    let mut last_id = 0i16;
    for _ in 0..64 {
      match r.read_field_header(last_id) {
        Ok(FieldHeader::Stop) => break,
        Ok(FieldHeader::Field(id, wt)) => {
          last_id = id;
          if r.skip_field(wt).is_err() {
            break;
          }
        }
        Err(_) => break,
      }
    }
  }
}
