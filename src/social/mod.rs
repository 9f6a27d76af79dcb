pub mod comments;
pub mod likes;

pub use comments::{CommentStatus, CommentThread};
pub use likes::LikeTracker;
