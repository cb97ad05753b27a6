//! Content hashing for Quire.
//!
//! Every stored object is addressed by a domain-separated BLAKE3 hash, so a
//! content snapshot and a commit header with identical bytes never share an
//! identifier. No custom cryptography: this wraps `blake3`.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
