pub mod config;
pub mod error;
pub mod ir;
pub mod logging;
pub mod maven;
pub mod recipe;
pub mod search;
