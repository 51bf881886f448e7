pub mod auth;
pub mod dao;
pub mod gamification;
pub mod lifecycle;
pub mod permissions;

pub use auth::AuthService;
pub use dao::*;
