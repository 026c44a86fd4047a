//! Hash computation and object identity for svcs.
//!
//! This crate provides the core `ObjectId` type (a 32-byte SHA3-256 digest),
//! hex encoding/decoding, and the streaming hasher used to compute object
//! ids from typed payloads.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;

/// Width of a digest in bytes.
pub const HASH_SIZE: usize = 32;

/// Width of a digest in lowercase hex characters.
pub const HASH_HEX_SIZE: usize = 64;
