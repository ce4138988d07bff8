//! Core primitives shared across the Stele anchoring gateway.
//!
//! Provides the 32-byte [`Hash`] used as a content identifier: every
//! anchoring request is correlated with its response through the SHA-256
//! hash of the payload it carries.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod error;
mod hash;

pub use error::{Error, Result};
pub use hash::{hash, Hash};
