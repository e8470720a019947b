pub mod api;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod dashboard;
pub mod errors;
pub mod instance;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod probe;
pub mod project;
pub mod report;
pub mod seed;
pub mod ui;
