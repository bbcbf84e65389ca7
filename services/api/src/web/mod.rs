pub mod analysis;
pub mod auth;
pub mod docs;
pub mod middleware;
pub mod state;

pub use middleware::{optional_auth, require_auth, CallerIdentity};
