//! Trakt: trending movies and shows, and the OAuth credential they need.

mod auth;
mod client;

pub use self::auth::{Token, TraktAuth};
pub use self::client::TraktTrending;

pub const BASE_URL: &str = "https://api.trakt.tv";
