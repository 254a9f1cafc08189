pub mod health;
pub mod org;
