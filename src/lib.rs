pub mod app;
pub mod config;
pub mod form;
pub mod remote;
pub mod shared;
pub mod tui;
