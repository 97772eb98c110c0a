//! MySQL implementations.

mod comment_repository;
mod like_table;
mod post_repository;
mod user_repository;

pub use comment_repository::MySqlCommentRepository;
pub use post_repository::MySqlPostRepository;
pub use user_repository::MySqlUserRepository;
