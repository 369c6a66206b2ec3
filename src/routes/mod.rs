pub mod health;
pub mod refresher;
pub mod weather;
