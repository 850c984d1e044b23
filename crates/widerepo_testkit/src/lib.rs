//! # WideRepo Testkit
//!
//! Test utilities for WideRepo.
//!
//! This crate provides:
//! - Fixture entities (`User`, hash-only; `Playlist`, range-aware with an
//!   index) with their key metadata
//! - Seeded in-memory repositories
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use widerepo_core::RepositoryConfig;
//! use widerepo_testkit::prelude::*;
//!
//! let repo = playlist_repository(RepositoryConfig::default(), &sample_playlists());
//! let found = repo.find_by_id(playlist_id("alice", "mix1")).unwrap();
//! assert!(found.is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
