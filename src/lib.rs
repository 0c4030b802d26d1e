//! Causerie is a terminal-first chat front-end for remote completion APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the conversation session, the completion
//!   request pipeline, the greeting animation, and configuration.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input, animation ticks, and display updates.
//! - [`api`] defines the payloads exchanged with the completions endpoint.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves configuration and dispatches
//! into [`ui::chat_loop`] for the interactive session.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
