pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod games;
pub mod geometry;
pub mod launcher;
pub mod logging;
pub mod runner;
pub mod surface;
pub mod ui;
