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

//! Split-block bloom filter evaluation. The header is a genuine
//! Thrift-encoded `BloomFilterHeader`, read with the same
//! `CompactProtocolReader` used for `FileMetaData`, rather than a
//! fabricated fixed-width header: `numBytes` (field 1) plus three
//! single-variant unions naming the algorithm, hash, and compression in
//! use (fields 2-4). Only `BLOCK`/`XXHASH`/`UNCOMPRESSED` are supported;
//! anything else degrades to "possibly present" rather than failing.

use byteorder::{ByteOrder, LittleEndian};
use xxhash_rust::xxh64::xxh64;

use crate::errors::{ParquetError, Result};
use crate::file::reader::ChunkReader;
use crate::thrift::{CompactProtocolReader, FieldHeader};

/// The fixed odd-prime salts, one per 32-bit lane within a 256-bit
/// block.
const SALTS: [u32; 8] = [
  0x47b6137b, 0x44974d91, 0x8824ad5b, 0xa2b7289d, 0x705495c7, 0x2df1424b, 0x9efc4947, 0x5c6bfb31,
];

const BLOCK_BYTES: u64 = 32;

/// The `SplitBlockAlgorithm`/`XxHash`/`Uncompressed` union tags this
/// crate understands. Each is an empty struct at field id 1 of its
/// enclosing union.
const SUPPORTED_UNION_TAG: i16 = 1;

/// Largest header probe this crate will read speculatively before it
/// knows the header's true encoded length. Real Parquet bloom headers
/// are a handful of bytes; this is generous headroom.
const HEADER_PROBE_CAP: usize = 256;

#[derive(Debug, Clone, Copy)]
struct BloomFilterHeader {
  num_blocks: u32,
}

/// Reads one single-variant union (algorithm/hash/compression), and
/// returns the field id that was set. Thrift unions are wire-identical
/// to structs with at most one field present.
fn parse_union_tag(r: &mut CompactProtocolReader) -> Result<i16> {
  let mut tag = None;
  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        if tag.is_none() {
          tag = Some(id);
        }
        r.skip_field(wt)?;
      }
    }
  }
  tag.ok_or_else(|| ParquetError::MalformedEncoding(r.offset(), "empty union in BloomFilterHeader".to_string()))
}

/// Parses a `BloomFilterHeader` struct. Returns `Ok(None)` when the
/// algorithm/hash/compression combination is not one this crate
/// evaluates — the caller must then treat the key as possibly present.
fn read_header(r: &mut CompactProtocolReader) -> Result<Option<BloomFilterHeader>> {
  let mut num_bytes = None;
  let mut algorithm_tag = None;
  let mut hash_tag = None;
  let mut compression_tag = None;

  let mut last_id = 0i16;
  loop {
    match r.read_field_header(last_id)? {
      FieldHeader::Stop => break,
      FieldHeader::Field(id, wt) => {
        last_id = id;
        match id {
          1 => num_bytes = Some(r.read_zigzag32()?),
          2 => algorithm_tag = Some(parse_union_tag(r)?),
          3 => hash_tag = Some(parse_union_tag(r)?),
          4 => compression_tag = Some(parse_union_tag(r)?),
          _ => r.skip_field(wt)?,
        }
      }
    }
  }

  let num_bytes = num_bytes.ok_or(ParquetError::MissingRequiredField("BloomFilterHeader.numBytes"))?;
  if num_bytes <= 0 || num_bytes as u64 % BLOCK_BYTES != 0 {
    return Err(ParquetError::MalformedEncoding(
      r.offset(),
      format!("bloom filter declares implausible size {} bytes", num_bytes),
    ));
  }

  if algorithm_tag != Some(SUPPORTED_UNION_TAG)
    || hash_tag != Some(SUPPORTED_UNION_TAG)
    || compression_tag != Some(SUPPORTED_UNION_TAG)
  {
    log::warn!(
      "bloom filter algorithm={:?} hash={:?} compression={:?} is not supported; treating key as possibly present",
      algorithm_tag, hash_tag, compression_tag
    );
    return Ok(None);
  }

  Ok(Some(BloomFilterHeader {
    num_blocks: (num_bytes as u64 / BLOCK_BYTES) as u32,
  }))
}

/// Tests one 32-byte block against a key's already-computed hash.
fn block_matches(block: &[u8], low32: u32) -> bool {
  for (i, salt) in SALTS.iter().enumerate() {
    let word = LittleEndian::read_u32(&block[i * 4..i * 4 + 4]);
    let mask_bit = (low32.wrapping_mul(*salt) >> 27) & 31;
    if word & (1u32 << mask_bit) == 0 {
      return false;
    }
  }
  true
}

/// Tests `key` against an already-read split-block bloom filter body.
/// `body` must be exactly `32 * num_blocks` bytes.
fn might_contain(body: &[u8], num_blocks: u32, key: &[u8]) -> bool {
  if num_blocks == 0 {
    return false;
  }
  let hash = xxh64(key, 0);
  let block_index = (((hash >> 32) * num_blocks as u64) >> 32) as usize;
  let low32 = (hash & 0xFFFF_FFFF) as u32;
  let start = block_index * BLOCK_BYTES as usize;
  block_matches(&body[start..start + BLOCK_BYTES as usize], low32)
}

/// Reads the bloom filter for one column chunk and tests `key` against
/// it. `bloom_offset`/`bloom_length` come directly from
/// `ColumnChunkMetaData::bloom_filter_offset`/`bloom_filter_length`. A
/// negative offset means the column has no bloom filter at all.
///
/// Returns `true` conservatively (possibly present) whenever the filter
/// uses an algorithm/hash/compression combination this crate does not
/// evaluate; returns an error only for structural corruption
/// (truncated input, implausible declared sizes) or absence.
pub fn test_bloom<R: ChunkReader>(source: &R, bloom_offset: i64, bloom_length: i64, key: &[u8]) -> Result<bool> {
  if bloom_offset < 0 {
    return Err(ParquetError::BloomAbsent);
  }
  let offset = bloom_offset as u64;
  let file_size = source.len();
  if offset >= file_size {
    return Err(ParquetError::TruncatedInput(offset as usize));
  }

  let available = (file_size - offset) as usize;
  let probe_len = if bloom_length > 0 {
    (bloom_length as usize).min(available).min(HEADER_PROBE_CAP)
  } else {
    available.min(HEADER_PROBE_CAP)
  };
  let probe = source.get_bytes(offset, probe_len)?;

  let mut r = CompactProtocolReader::new(&probe);
  let header = match read_header(&mut r)? {
    None => return Ok(true),
    Some(h) => h,
  };
  let header_len = r.offset() as u64;
  let body_len = header.num_blocks as u64 * BLOCK_BYTES;

  let body_start = offset + header_len;
  if body_start + body_len > file_size {
    return Err(ParquetError::TruncatedInput(body_start as usize));
  }

  let body = source.get_bytes(body_start, body_len as usize)?;
  Ok(might_contain(&body, header.num_blocks, key))
}
