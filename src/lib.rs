// src/lib.rs

//! Parcel tracking lookup library

pub mod error;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
