pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod playback;
pub mod request;
pub mod ui;
pub mod ytdlp;
