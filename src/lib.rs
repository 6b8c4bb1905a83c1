// src/lib.rs - Host-side harness for the segmented-LCD watch firmware
pub mod apps;
pub mod bridge;
pub mod config;
pub mod display;
pub mod firmware;
pub mod hardware;
pub mod rtc;
pub mod scheduler;
pub mod terminal;
