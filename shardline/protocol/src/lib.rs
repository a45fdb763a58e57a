//! PostgreSQL extended-query frontend.
//!
//! Statements arrive already parsed and bound (see [`shardline_binder::BindEngine`]). This crate
//! turns Bind/Describe/Execute/Close requests into backend packets, driving a
//! [`backend::BackendHandler`] for the actual work.

pub mod backend;
pub mod error;
pub mod postgresql;
