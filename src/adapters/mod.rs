//! External system adapters

pub mod database;
pub mod postgres;
