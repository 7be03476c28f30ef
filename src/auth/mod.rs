mod claims;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod schema;
pub mod services;

pub use identity::Identity;
