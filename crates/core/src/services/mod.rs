//! Business logic services.

pub mod comment;
pub mod research;
pub mod user;
pub mod vote;

pub use comment::{CommentService, CreateCommentInput};
pub use research::{CreateResearchInput, ResearchService, UpdateResearchInput};
pub use user::{CreateUserInput, LoginInput, UserService};
pub use vote::{VoteOutcome, VoteService, VoteTarget, VoteTransition};
