pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod sensors;
pub mod simulation;
pub mod steering;
pub mod track;
pub mod track_format;
