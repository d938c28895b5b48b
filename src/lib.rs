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

//! A read-only decoder for Parquet file footers: locates and validates
//! the trailer, parses the Thrift-encoded `FileMetaData`, reassembles
//! the schema tree, decodes per-column statistics, and evaluates
//! split-block bloom filters. Row/page data is never read or
//! decompressed; see [`file::reader::ChunkReader`] for the only I/O
//! abstraction this crate depends on.
//!
//! ```no_run
//! use std::fs::File;
//! use parquet_footer::file::footer::parse_metadata;
//!
//! let file = File::open("example.parquet")?;
//! let metadata = parse_metadata(&file)?;
//! println!("{} row groups", metadata.num_row_groups());
//! # Ok::<(), parquet_footer::errors::ParquetError>(())
//! ```

#[macro_use]
extern crate quick_error;

#[macro_use]
mod macros;

pub mod basic;
pub mod bloom_filter;
pub mod errors;
pub mod file;
pub mod schema;
pub mod thrift;

pub use bloom_filter::test_bloom;
pub use errors::{ParquetError, Result};
pub use file::footer::parse_metadata;
pub use file::metadata::ParquetMetaData;
pub use file::reader::{ChunkReader, Length};
