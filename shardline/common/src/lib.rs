pub mod constants;
pub mod data_type;
pub mod dialect;
pub mod error;
pub mod value;
