pub mod auth;
pub mod banner;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod history;
pub mod image;
pub mod painter;
pub mod server;
