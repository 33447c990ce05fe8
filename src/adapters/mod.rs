pub mod database;
pub mod signal;
