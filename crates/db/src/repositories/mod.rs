//! Database repositories.

mod comment;
mod research;
mod user;
mod vote;

pub use comment::CommentRepository;
pub use research::ResearchRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
