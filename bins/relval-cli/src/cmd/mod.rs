pub mod cast;
pub mod config;
pub mod encode;
pub mod error;
pub mod eval;
pub mod literal;
