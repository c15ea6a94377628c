pub mod channels;
pub mod health;
