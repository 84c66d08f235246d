//! Data models for Mitra

mod session;
mod user;

pub use session::*;
pub use user::*;
