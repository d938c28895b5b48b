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

//! The "Byte Source" external collaborator, named `ChunkReader`
//! after the trait pair real `parquet`/`arrow-rs` readers use for this
//! exact role. This crate depends only on the interface; it is never
//! responsible for caching, prefetching, or memory-mapping policy.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Mutex;

use crate::errors::Result;

/// Anything that can report its total byte length.
pub trait Length {
  fn len(&self) -> u64;
}

/// A random-access byte source: given a byte range, returns exactly
/// that many bytes or fails. The decoder borrows this for the duration
/// of one decode call and never retains it afterward.
pub trait ChunkReader: Length {
  type T: Read;

  /// Returns a `Read` positioned at `start` for up to `length` bytes.
  fn get_read(&self, start: u64, length: usize) -> Result<Self::T>;

  /// Convenience: eagerly reads `length` bytes starting at `start`
  /// into an owned `Vec<u8>`.
  fn get_bytes(&self, start: u64, length: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; length];
    let mut reader = self.get_read(start, length)?;
    reader.read_exact(&mut buf)?;
    Ok(buf)
  }
}

impl Length for File {
  fn len(&self) -> u64 {
    self.metadata().map(|m| m.len()).unwrap_or(0)
  }
}

/// A bounded window onto a `File`, handed out by `ChunkReader::get_read`.
/// Each window owns its own cloned file handle and seeks under its own
/// lock, so concurrent reads against the same underlying file do not
/// race on a shared cursor, letting independent reads run in parallel
/// against the same source.
pub struct FileSource {
  file: Mutex<File>,
  end: u64,
  pos: u64,
}

impl FileSource {
  fn new(file: File, start: u64, length: usize) -> Self {
    FileSource {
      file: Mutex::new(file),
      end: start + length as u64,
      pos: start,
    }
  }
}

impl Read for FileSource {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let remaining = (self.end - self.pos) as usize;
    if remaining == 0 {
      return Ok(0);
    }
    let to_read = remaining.min(buf.len());
    let mut file = self.file.lock().unwrap();
    file.seek(SeekFrom::Start(self.pos))?;
    let read = file.read(&mut buf[..to_read])?;
    drop(file);
    self.pos += read as u64;
    Ok(read)
  }
}

impl ChunkReader for File {
  type T = FileSource;

  fn get_read(&self, start: u64, length: usize) -> Result<Self::T> {
    let cloned = self.try_clone()?;
    Ok(FileSource::new(cloned, start, length))
  }
}

impl Length for Vec<u8> {
  fn len(&self) -> u64 {
    <[u8]>::len(self.as_slice()) as u64
  }
}

impl ChunkReader for Vec<u8> {
  type T = io::Cursor<Vec<u8>>;

  fn get_read(&self, start: u64, length: usize) -> Result<Self::T> {
    let start = start as usize;
    let end = start + length;
    if end > self.len() {
      return Err(crate::errors::ParquetError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "requested range exceeds buffer length",
      )));
    }
    Ok(io::Cursor::new(self[start..end].to_vec()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn vec_chunk_reader_reads_exact_range() {
    let data: Vec<u8> = (0u8..=255).collect();
    assert_eq!(ChunkReader::get_bytes(&data, 10, 4).unwrap(), vec![10, 11, 12, 13]);
  }

  #[test]
  fn vec_chunk_reader_rejects_out_of_range() {
    let data = vec![1u8, 2, 3];
    assert!(ChunkReader::get_bytes(&data, 0, 10).is_err());
  }

  #[test]
  fn file_chunk_reader_reads_exact_range() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(b"0123456789").unwrap();
    let file = tmp.reopen().unwrap();
    assert_eq!(Length::len(&file), 10);
    assert_eq!(ChunkReader::get_bytes(&file, 3, 4).unwrap(), b"3456");
  }
}
