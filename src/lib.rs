//! remote control client for hyperion json servers

pub mod common;
pub mod controller;
pub mod entity;
pub mod network;
pub mod server_control;
pub mod settings;
pub mod socket;
pub mod storage;
