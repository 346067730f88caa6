pub mod client;
pub mod error;
pub mod favorite;
pub mod recipe;
pub mod repository;
