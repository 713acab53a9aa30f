pub mod github;
pub mod handlers;
pub mod identity;
pub mod lookup;
pub mod session;
