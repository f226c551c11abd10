pub mod audio;
pub mod clipboard;
pub mod config;
pub mod repositories;
pub mod websocket;
