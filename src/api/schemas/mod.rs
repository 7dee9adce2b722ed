pub mod complaints;
pub mod health;
