pub mod archive;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod launcher;
pub mod layout;
pub mod model;
pub mod platform;
pub mod provision;
pub mod runtime;
pub mod source;
