pub mod config;
pub mod logging;

pub mod catalog;
pub mod control;
pub mod error;
pub mod fetch;
pub mod populate;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod url_model;
