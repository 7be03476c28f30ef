pub mod repo_types;
pub mod schema;
pub mod services;
