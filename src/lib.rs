pub mod cli;
pub mod client;
pub mod config;
pub mod flows;
pub mod notify;
pub mod session;
