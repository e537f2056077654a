// src/error.rs

//! Error types for fallible S2 operations.

use thiserror::Error;

/// Errors produced by decoding, validation and checked constructors.
#[derive(Debug, Error)]
pub enum S2Error {
  #[error("unsupported encoding version {0}")]
  UnsupportedVersion(u8),

  #[error("too many cells ({count}; max is {max})")]
  TooManyCells { count: usize, max: usize },

  #[error("too many loops ({count}; max is {max})")]
  TooManyLoops { count: usize, max: usize },

  #[error("too many vertices ({count}; max is {max})")]
  TooManyVertices { count: usize, max: usize },

  #[error("truncated input while reading {what}")]
  Truncated { what: &'static str },

  #[error("invalid cell id {0:#018x}")]
  InvalidCellId(u64),

  #[error("level {0} is out of range [0, 30]")]
  InvalidLevel(i32),

  #[error("invalid loop: {0}")]
  InvalidLoop(String),

  #[error("invalid polygon: {0}")]
  InvalidPolygon(String),

  #[error("malformed encoding: {0}")]
  Malformed(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, S2Error>;
