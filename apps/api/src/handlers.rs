pub mod cache;
pub mod courses;
pub mod health;
