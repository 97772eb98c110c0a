//! # Agora Core
//!
//! Core types, errors and domain entities shared by every layer of the
//! like engine: typed ids, the [`ContentKind`] tag, posts, comments and users.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod traits;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use traits::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
