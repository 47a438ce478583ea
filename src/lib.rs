pub mod app;
pub mod catalog;
pub mod config;
pub mod console;
pub mod model;
pub mod ops;
pub mod report;
pub mod shared;
pub mod tui;
pub mod wizard;
