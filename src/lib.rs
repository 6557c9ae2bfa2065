//! PNADC indicators dashboard: data loading, the filter/aggregate engine and
//! the egui front end that draws its views.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
