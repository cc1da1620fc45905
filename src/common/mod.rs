pub mod setting;
pub mod logger;
pub mod sqlite;
pub mod error;
pub mod dao;
