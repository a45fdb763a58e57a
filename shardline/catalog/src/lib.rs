pub mod column;
pub mod error;
pub mod memory;
pub mod provider;
pub mod rule;
