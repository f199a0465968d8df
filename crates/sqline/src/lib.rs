//! sqline: a terminal SQL client with a vim-style query editor.
//!
//! The editor core lives in [`editor`] and [`vim`] on top of the
//! `gap-buffer` crate; [`app`] wires it to a ratatui terminal and a
//! PostgreSQL connection from [`db`].

pub mod app;
pub mod config;
pub mod db;
pub mod editor;
pub mod ui;
pub mod vim;
