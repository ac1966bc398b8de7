#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod bucket;
pub mod config;
pub mod controller;
pub mod error;
pub mod producer;
pub mod telemetry;
pub mod types;
pub mod worker;

pub type Result<T> = std::result::Result<T, error::Error>;
