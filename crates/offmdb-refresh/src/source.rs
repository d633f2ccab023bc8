//! Streaming lines out of a cached gzip file.

use std::{
  fs::File,
  io::{self, BufRead as _, BufReader},
  path::Path,
};

use flate2::read::GzDecoder;

/// A lazy, single-pass iterator over the decompressed lines of a `.gz` file.
///
/// Line terminators (`\n` or `\r\n`) are stripped and invalid UTF-8 is
/// replaced rather than rejected. The first I/O or gzip error is yielded
/// once and ends the iteration.
pub struct LineSource {
  reader: BufReader<GzDecoder<File>>,
  buf:    Vec<u8>,
  done:   bool,
}

impl LineSource {
  pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
    let file = File::open(path)?;
    Ok(Self {
      reader: BufReader::with_capacity(1 << 16, GzDecoder::new(file)),
      buf:    Vec::with_capacity(256),
      done:   false,
    })
  }
}

impl Iterator for LineSource {
  type Item = io::Result<String>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    self.buf.clear();
    match self.reader.read_until(b'\n', &mut self.buf) {
      Ok(0) => {
        self.done = true;
        None
      }
      Ok(_) => {
        let mut line: &[u8] = &self.buf;
        if let Some(rest) = line.strip_suffix(b"\n") {
          line = rest;
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
          line = rest;
        }
        Some(Ok(String::from_utf8_lossy(line).into_owned()))
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}
