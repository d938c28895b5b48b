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

use std::io;

quick_error! {
  /// The stable error surface of this crate.
  ///
  /// Every variant except `Io` carries the byte offset (within the slice
  /// being decoded) at which the failure was detected, when one is
  /// meaningful.
  #[derive(Debug)]
  pub enum ParquetError {
    /// The byte source is smaller than the 8-byte trailer.
    TooSmall(size: u64) {
      display("Corrupted file: size {} is smaller than the footer trailer", size)
    }
    /// The trailing 4 bytes are not `PAR1`.
    BadMagic {
      display("Invalid Parquet file: corrupt footer magic")
    }
    /// The trailing magic is `PARE` (encrypted footer), which this
    /// decoder does not support.
    Encrypted {
      display("Encrypted Parquet footer (PARE) is not supported")
    }
    /// EOF was reached mid-way through decoding a value.
    TruncatedInput(offset: usize) {
      display("Truncated input at offset {}", offset)
    }
    /// The byte stream violates the Compact Protocol or Parquet framing
    /// in a way that is not just "ran out of bytes".
    MalformedEncoding(offset: usize, reason: String) {
      display("Malformed encoding at offset {}: {}", offset, reason)
    }
    /// A Thrift struct required by spec was absent from the stream.
    MissingRequiredField(field: &'static str) {
      display("Missing required field `{}`", field)
    }
    /// A `ColumnChunk` path did not resolve to any schema leaf.
    SchemaMismatch(path: String) {
      display("Column chunk `{}` does not match any schema leaf", path)
    }
    /// The caller asked to test a bloom filter that is not present.
    BloomAbsent {
      display("Column chunk has no bloom filter")
    }
    /// Propagated verbatim from the byte source.
    Io(err: io::Error) {
      display("I/O error: {}", err)
      from()
      cause(err)
    }
  }
}

pub type Result<T> = ::std::result::Result<T, ParquetError>;
