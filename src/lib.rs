pub mod cli;
pub mod config;
pub mod errors;
pub mod event;
pub mod fill;
pub mod orderbook;
pub mod orders;
pub mod price;
pub mod replay;
pub mod simulate;
