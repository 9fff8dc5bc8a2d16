//! Error classification.
//!
//! Every error type of this crate (and of its backends) can be classified with [`ErrorKind`]. It
//! answers the one question callers usually care about: is it my fault or the device’s?

use std::fmt;

/// Class of an error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
  /// The API was misused: wrong size, stale handle, drawing without a render target, etc.
  ///
  /// Fixing the call fixes the error.
  Usage,
  /// The device could not satisfy the request, typically because it ran out of memory or
  /// refused to create a surface.
  ResourceExhausted,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ErrorKind::Usage => f.write_str("usage error"),
      ErrorKind::ResourceExhausted => f.write_str("resource exhausted"),
    }
  }
}
