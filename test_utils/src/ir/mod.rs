pub mod builders;
pub mod generator;
