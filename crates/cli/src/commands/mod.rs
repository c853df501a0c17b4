pub mod calendar;
pub mod chat;
pub mod config_cmd;
pub mod enhance;
pub mod relay;
