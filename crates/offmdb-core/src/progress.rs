//! Progress reporting on a 0–100 scale.
//!
//! Each ingest stage owns a sub-range of the scale and maps rows processed
//! onto it. The meter only forwards a percentage when it increases, which
//! keeps the observer's call rate bounded and the sequence monotonic. Stages
//! that share one observer report through [`Monotonic`] so a range boundary
//! is not announced twice.

use std::sync::{
  Arc,
  atomic::{AtomicI16, Ordering},
};

/// Receives progress percentages. Must not block: it is called from the
/// ingest loop.
pub trait ProgressSink: Send + Sync {
  fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
  F: Fn(u8) + Send + Sync,
{
  fn report(&self, percent: u8) { self(percent) }
}

/// Forwards a percentage only when it exceeds everything forwarded before.
pub struct Monotonic {
  inner: Arc<dyn ProgressSink>,
  last:  AtomicI16,
}

impl Monotonic {
  pub fn new(inner: Arc<dyn ProgressSink>) -> Self {
    Self { inner, last: AtomicI16::new(-1) }
  }
}

impl ProgressSink for Monotonic {
  fn report(&self, percent: u8) {
    if self.last.fetch_max(i16::from(percent), Ordering::SeqCst) < i16::from(percent) {
      self.inner.report(percent);
    }
  }
}

/// A contiguous slice of the overall scale, `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRange {
  pub start: u8,
  pub end:   u8,
}

impl ProgressRange {
  pub fn new(start: u8, end: u8) -> Self {
    let end = end.min(100);
    Self { start: start.min(end), end }
  }

  /// Map `rows` of an expected `expected_rows` linearly onto the range.
  /// Rows beyond the expectation are capped at `end`.
  pub fn at(self, rows: u64, expected_rows: u64) -> u8 {
    let expected = expected_rows.max(1);
    let span = u64::from(self.end - self.start);
    let done = rows.min(expected);
    self.start + (span * done / expected) as u8
  }
}

/// Tracks one stage's progress and forwards changes to a sink.
pub struct ProgressMeter<'a> {
  sink:          &'a dyn ProgressSink,
  range:         ProgressRange,
  expected_rows: u64,
  last:          Option<u8>,
}

impl<'a> ProgressMeter<'a> {
  pub fn new(sink: &'a dyn ProgressSink, range: ProgressRange, expected_rows: u64) -> Self {
    Self { sink, range, expected_rows, last: None }
  }

  /// Announce the start of the range.
  pub fn begin(&mut self) { self.emit(self.range.start); }

  pub fn advance(&mut self, rows: u64) {
    let percent = self.range.at(rows, self.expected_rows);
    self.emit(percent);
  }

  /// Jump to the end of the range, regardless of rows seen.
  pub fn finish(&mut self) { self.emit(self.range.end); }

  fn emit(&mut self, percent: u8) {
    if self.last.is_none_or(|last| percent > last) {
      self.last = Some(percent);
      self.sink.report(percent);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  #[test]
  fn range_maps_linearly_and_caps() {
    let r = ProgressRange::new(25, 100);
    assert_eq!(r.at(0, 1000), 25);
    assert_eq!(r.at(500, 1000), 62);
    assert_eq!(r.at(1000, 1000), 100);
    assert_eq!(r.at(5000, 1000), 100);
    assert_eq!(r.at(10, 0), 100);
  }

  #[test]
  fn range_is_clamped() {
    let r = ProgressRange::new(120, 150);
    assert_eq!(r, ProgressRange { start: 100, end: 100 });
  }

  #[test]
  fn meter_reports_only_changes() {
    let seen = Mutex::new(Vec::new());
    let sink = |p: u8| seen.lock().unwrap().push(p);
    let mut meter = ProgressMeter::new(&sink, ProgressRange::new(0, 25), 100);

    meter.begin();
    for rows in 1..=100 {
      meter.advance(rows);
    }
    meter.finish();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen, (0..=25).collect::<Vec<u8>>());
  }

  #[test]
  fn consecutive_meters_are_monotonic() {
    let seen = Mutex::new(Vec::new());
    let sink = |p: u8| seen.lock().unwrap().push(p);

    let mut first = ProgressMeter::new(&sink, ProgressRange::new(0, 25), 7);
    first.begin();
    (1..=3).for_each(|r| first.advance(r));
    first.finish();

    let mut second = ProgressMeter::new(&sink, ProgressRange::new(25, 100), 11);
    second.begin();
    (1..=40).for_each(|r| second.advance(r));
    second.finish();

    let seen = seen.into_inner().unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|p| *p <= 100));
    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
    // Each meter announces 25 on its own.
    assert_eq!(seen.iter().filter(|p| **p == 25).count(), 2);
  }

  #[test]
  fn shared_boundary_is_reported_once() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let inner: Arc<dyn ProgressSink> = {
      let seen = seen.clone();
      Arc::new(move |p: u8| seen.lock().unwrap().push(p))
    };
    let sink = Monotonic::new(inner);

    let mut first = ProgressMeter::new(&sink, ProgressRange::new(0, 25), 4);
    first.begin();
    (1..=4).for_each(|r| first.advance(r));
    first.finish();
    let mut second = ProgressMeter::new(&sink, ProgressRange::new(25, 100), 3);
    second.begin();
    (1..=3).for_each(|r| second.advance(r));
    second.finish();
    sink.report(60);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, [0, 6, 12, 18, 25, 50, 75, 100]);
  }
}
