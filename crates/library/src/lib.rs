//! Trending media matching and symlink reconciliation.
//!
//! The pipeline for each media class:
//! 1. a [`LibraryIndex`] (local identifiers to content directories) and a
//!    [`TrendingList`] are obtained through the [`provider`] traits, each
//!    behind the [snapshot cache](emberly_cache),
//! 2. [`match_trending`] resolves trending entries against the index using
//!    the class's identifier [scheme priority](MediaClass::schemes),
//! 3. [`reconcile`] converges a target directory's symlinks onto the matches.
//!
//! [`run`](run::run) sequences all of this for every configured class.

pub mod error;
mod matching;
mod models;
pub mod provider;
pub mod reconcile;
pub mod run;

pub use crate::matching::match_trending;
pub use crate::models::{
    Identifiers, LibraryIndex, LibraryItem, MatchResult, MediaClass, Scheme, TrendingEntry, TrendingList,
};
