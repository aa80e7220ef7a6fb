pub mod config;
pub mod dataset;
pub mod export;
pub mod filter;
pub mod state;
pub mod views;
