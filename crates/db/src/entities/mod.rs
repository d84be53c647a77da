//! Database entities.

pub mod comment;
pub mod research;
pub mod user;
pub mod vote;

pub use comment::Entity as Comment;
pub use research::Entity as Research;
pub use user::Entity as User;
pub use vote::Entity as Vote;
