//! Business logic services.

pub mod auth;
pub mod content;
pub mod group;
pub mod media;
pub mod reaction;
pub mod topic;
pub mod user;

pub use auth::AuthService;
pub use content::ContentService;
pub use group::GroupService;
pub use media::{ImageInput, MediaService};
pub use reaction::{ReactionOutcome, ReactionService};
pub use topic::TopicService;
pub use user::UserService;
