pub mod correlation;
pub mod docs;
pub mod forecast;
pub mod health;
