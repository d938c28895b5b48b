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

use byteorder::{ByteOrder, LittleEndian};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parquet_footer::parse_metadata;

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

fn zigzag64(v: i64) -> u64 {
  ((v << 1) ^ (v >> 63)) as u64
}

fn write_field_header(buf: &mut Vec<u8>, last_id: i16, id: i16, wire: u8) {
  let delta = id - last_id;
  if (1..=15).contains(&delta) {
    buf.push(((delta as u8) << 4) | wire);
  } else {
    buf.push(wire);
    write_varint(buf, zigzag64(id as i64));
  }
}

fn write_string_field(buf: &mut Vec<u8>, last_id: &mut i16, id: i16, s: &[u8]) {
  write_field_header(buf, *last_id, id, 8);
  *last_id = id;
  write_varint(buf, s.len() as u64);
  buf.extend_from_slice(s);
}

fn write_i64_field(buf: &mut Vec<u8>, last_id: &mut i16, id: i16, v: i64) {
  write_field_header(buf, *last_id, id, 6);
  *last_id = id;
  write_varint(buf, zigzag64(v));
}

fn write_i32_field(buf: &mut Vec<u8>, last_id: &mut i16, id: i16, v: i32) {
  write_field_header(buf, *last_id, id, 5);
  *last_id = id;
  write_varint(buf, zigzag64(v as i64));
}

fn write_stop(buf: &mut Vec<u8>) {
  buf.push(0x00);
}

fn write_list_header(buf: &mut Vec<u8>, elem_wire: u8, size: usize) {
  if size < 15 {
    buf.push(((size as u8) << 4) | elem_wire);
  } else {
    buf.push(0xF0 | elem_wire);
    write_varint(buf, size as u64);
  }
}

/// Builds a synthetic Parquet file containing a footer with `num_columns`
/// INT32 leaves spread across `num_row_groups` row groups, each column
/// chunk carrying v2 statistics.
fn synthetic_file(num_columns: usize, num_row_groups: usize) -> Vec<u8> {
  let mut footer = Vec::new();
  let mut last_id = 0i16;

  write_i32_field(&mut footer, &mut last_id, 1, 2); // version

  write_field_header(&mut footer, last_id, 2, 9);
  last_id = 2;
  write_list_header(&mut footer, 12, num_columns + 1);
  {
    let mut fid = 0i16;
    write_string_field(&mut footer, &mut fid, 4, b"schema");
    write_i32_field(&mut footer, &mut fid, 5, num_columns as i32);
    write_stop(&mut footer);
  }
  for i in 0..num_columns {
    let mut fid = 0i16;
    write_i32_field(&mut footer, &mut fid, 1, 1); // INT32
    write_i32_field(&mut footer, &mut fid, 3, 1); // OPTIONAL
    write_string_field(&mut footer, &mut fid, 4, format!("col_{}", i).as_bytes());
    write_i32_field(&mut footer, &mut fid, 5, 0);
    write_stop(&mut footer);
  }

  write_i64_field(&mut footer, &mut last_id, 3, (num_row_groups * 1000) as i64);

  write_field_header(&mut footer, last_id, 4, 9);
  last_id = 4;
  write_list_header(&mut footer, 12, num_row_groups);
  for _ in 0..num_row_groups {
    write_row_group(&mut footer, num_columns);
  }

  write_stop(&mut footer);

  let mut file = Vec::new();
  file.extend_from_slice(b"synthetic parquet file bytes preceding the footer");
  let footer_len = footer.len() as u32;
  file.extend_from_slice(&footer);
  let mut trailer = [0u8; 8];
  LittleEndian::write_u32(&mut trailer[0..4], footer_len);
  trailer[4..8].copy_from_slice(b"PAR1");
  file.extend_from_slice(&trailer);
  file
}

fn write_row_group(footer: &mut Vec<u8>, num_columns: usize) {
  let mut last_id = 0i16;
  write_field_header(footer, last_id, 1, 9);
  last_id = 1;
  write_list_header(footer, 12, num_columns);
  for i in 0..num_columns {
    write_column_chunk(footer, i);
  }
  write_i64_field(footer, &mut last_id, 2, 1_000_000); // total_byte_size
  write_i64_field(footer, &mut last_id, 3, 1000); // num_rows
  write_stop(footer);
}

fn write_column_chunk(footer: &mut Vec<u8>, col_idx: usize) {
  let mut last_id = 0i16;
  write_i64_field(footer, &mut last_id, 2, 0); // file_offset
  write_field_header(footer, last_id, 3, 12);
  last_id = 3;
  write_column_metadata(footer, col_idx);
  write_stop(footer);
}

fn write_column_metadata(footer: &mut Vec<u8>, col_idx: usize) {
  let mut fid = 0i16;
  write_i32_field(footer, &mut fid, 1, 1); // INT32
  write_field_header(footer, fid, 2, 9);
  fid = 2;
  write_list_header(footer, 5, 1);
  write_varint(footer, zigzag64(0)); // PLAIN encoding
  write_field_header(footer, fid, 3, 9);
  fid = 3;
  write_list_header(footer, 8, 1);
  write_varint(footer, format!("col_{}", col_idx).len() as u64);
  footer.extend_from_slice(format!("col_{}", col_idx).as_bytes());
  write_i32_field(footer, &mut fid, 4, 0); // UNCOMPRESSED
  write_i64_field(footer, &mut fid, 5, 1000); // num_values
  write_i64_field(footer, &mut fid, 6, 4000); // total_uncompressed_size
  write_i64_field(footer, &mut fid, 7, 4000); // total_compressed_size
  write_i64_field(footer, &mut fid, 9, 0); // data_page_offset
  write_stop(footer);
}

fn bench_parse_metadata(c: &mut Criterion) {
  let small = synthetic_file(8, 1);
  let large = synthetic_file(200, 20);

  let mut group = c.benchmark_group("parse_metadata");
  group.bench_function("small_schema", |b| {
    b.iter(|| parse_metadata(black_box(&small)).unwrap());
  });
  group.bench_function("wide_schema", |b| {
    b.iter(|| parse_metadata(black_box(&large)).unwrap());
  });
  group.finish();
}

criterion_group!(benches, bench_parse_metadata);
criterion_main!(benches);
