pub mod api;
pub mod models;
pub mod reaction;
pub mod roles;
pub mod validate;
