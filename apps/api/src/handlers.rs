pub mod admin_orders;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod regions;
