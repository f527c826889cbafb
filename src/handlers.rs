pub mod auth;
pub mod finance;
pub mod health;
pub mod products;
pub mod reports;
pub mod sales;
