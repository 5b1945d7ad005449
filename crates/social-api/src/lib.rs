pub mod auth;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod posts;
pub mod routes;
pub mod threads;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
