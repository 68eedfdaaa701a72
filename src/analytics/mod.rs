pub mod align;
pub mod correlation;
pub mod forecast;
pub mod mock;
pub mod stats;
