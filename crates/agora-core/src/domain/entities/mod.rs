//! Domain entities.

mod comment;
mod content;
mod post;
mod user;

pub use comment::Comment;
pub use content::ContentItem;
pub use post::Post;
pub use user::User;
