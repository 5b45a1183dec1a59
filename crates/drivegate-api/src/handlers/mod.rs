pub mod folders;
pub mod health;
pub mod upload;
