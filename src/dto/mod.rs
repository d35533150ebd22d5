pub mod auth;
pub mod inventory;
pub mod media;
pub mod orders;
pub mod products;
