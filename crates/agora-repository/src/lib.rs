//! # Agora Repository
//!
//! Durable side of the like engine:
//!
//! ```text
//! LikeService
//!   ↓  Arc<dyn PostRepository> / Arc<dyn CommentRepository>   (content store)
//!   ↓  Arc<dyn UserRepository>                                (user directory)
//! MySqlPostRepository, MySqlCommentRepository, MySqlUserRepository
//!   ↓  Arc<dyn DatabasePoolInterface>
//! MySQL
//! ```
//!
//! Each content row carries its liked-by relation in a join table
//! (`post_likes`, `comment_likes`). Loading a post or comment always loads
//! that relation; saving one replaces it.

pub mod mysql;
pub mod pool;
pub mod traits;

pub use mysql::*;
pub use pool::*;
pub use traits::*;
