//! Concrete collaborators for the emberly pipeline.
//!
//! - [`EmbyLibrary`] lists the local library from one or more Emby servers,
//! - [`TraktTrending`] supplies trending movies and shows, authorized by
//!   [`TraktAuth`],
//! - [`AniListTrending`] supplies trending or seasonal anime.
//!
//! All of them share one [`reqwest::Client`] built by [`http::client`].

mod anilist;
mod emby;
pub mod error;
pub mod http;
mod paging;
pub mod trakt;

pub use crate::anilist::{AniListTrending, Season};
pub use crate::emby::EmbyLibrary;
pub use crate::trakt::{Token, TraktAuth, TraktTrending};
