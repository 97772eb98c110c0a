//! # Agora Service
//!
//! Write-back like cache. Reads and toggles are served from a [`CacheStore`]
//! holding one set of user ids per liked item; the durable relation is only
//! read when an item is first touched and only written by [`LikeService::flush_all`].

pub mod cache;
pub mod r#impl;
pub mod like_service;
pub mod metrics;

pub use cache::*;
pub use like_service::*;
pub use r#impl::*;
