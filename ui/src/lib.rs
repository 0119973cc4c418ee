//! egui front end for remote data tables.
//!
//! Each configured table is rendered by [`widgets::data_table`] from its
//! [`tables_business::TableHandle`].

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod state;
pub mod utils;
pub mod widgets;

pub use app::TablesApp;
