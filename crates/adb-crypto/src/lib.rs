//! Hashing primitives for ADB.
//!
//! Provides domain-separated BLAKE3 content hashing (record identity) and
//! Keccak-256 (event topics).
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod keccak;

pub use hasher::{HasherError, IdentityHasher};
pub use keccak::{keccak256, keccak256_hex};
