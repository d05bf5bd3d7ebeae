pub mod address;
pub mod bootstrap;
pub mod builder;
pub mod config;
pub mod error;
pub mod generate;
pub mod logger;
pub mod runner;
pub mod writer;
