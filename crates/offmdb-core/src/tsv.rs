//! Tab-separated record parsing.
//!
//! The source files use a bare `\t` delimiter with no quoting or escaping.
//! The first line of every file is the header.

/// Split a line into its fields.
pub fn split_fields(line: &str) -> Vec<&str> { line.split('\t').collect() }

/// A line classified by its position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
  Header(String),
  Data {
    /// 1-based line number in the file; the header is line 1.
    line_no: u64,
    line:    String,
  },
}

impl Record {
  pub fn fields(&self) -> Vec<&str> {
    match self {
      Self::Header(line) | Self::Data { line, .. } => split_fields(line),
    }
  }
}

/// Adapts a line iterator into [`Record`]s.
pub struct Records<I> {
  lines:   I,
  line_no: u64,
}

impl<I> Records<I> {
  pub fn new(lines: I) -> Self { Self { lines, line_no: 0 } }
}

impl<I, E> Iterator for Records<I>
where
  I: Iterator<Item = Result<String, E>>,
{
  type Item = Result<Record, E>;

  fn next(&mut self) -> Option<Self::Item> {
    let line = match self.lines.next()? {
      Ok(line) => line,
      Err(e) => return Some(Err(e)),
    };
    self.line_no += 1;
    Some(Ok(if self.line_no == 1 {
      Record::Header(line)
    } else {
      Record::Data { line_no: self.line_no, line }
    }))
  }
}
