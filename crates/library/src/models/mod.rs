//! Data model shared by the matcher, the reconciler and the collaborators.

mod identifiers;
mod index;
mod media;
mod trending;

pub use self::identifiers::Identifiers;
pub use self::index::{LibraryIndex, LibraryItem};
pub use self::media::{MediaClass, Scheme};
pub use self::trending::{MatchResult, TrendingEntry, TrendingList};
