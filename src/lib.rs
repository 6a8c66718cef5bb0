pub mod client;
pub mod config;
pub mod playground;
pub mod web;
