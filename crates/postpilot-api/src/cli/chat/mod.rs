//! Interactive terminal chat client for PostPilot.
//!
//! Talks to a running server over HTTP. `controller` holds the session
//! state, `loop_runner::run_chat_loop` drives it from the keyboard.

pub mod backend;
pub mod commands;
pub mod controller;
pub mod input;
pub mod loop_runner;
pub mod renderer;
