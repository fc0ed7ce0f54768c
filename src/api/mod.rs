pub mod actor;
pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use actor::{ACTOR_ROLE_HEADER, Actor};
pub use error::ApiError;
pub use router::create_router;
pub use types::*;
