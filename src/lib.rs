pub mod cache;
pub mod config;
pub mod error;
pub mod ics;
pub mod server;
pub mod shutdown;
pub mod startup;
