//! Roof sketch host: configuration, storage, and the command-line driver
//! around the [`canvas`] engine.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`cli`] | Subcommands: show, replay, render, discard |
//! | [`config`] | [`config::AppConfig`] from environment and flags |
//! | [`db`] | SQLite pool and embedded migrations |
//! | [`services`] | Canvas record store, snapshots, persistence adapter |
//! | [`state`] | [`state::AppState`] shared by every command |

pub mod cli;
pub mod config;
pub mod db;
pub mod services;
pub mod state;
