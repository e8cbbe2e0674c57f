//! Route table and navigation guard

pub mod guard;
pub mod routes;

pub use guard::{Navigation, RouterGuard, login_redirect, post_login_destination};
pub use routes::{Route, RouteMeta};
