//! topdon-remote client library
//!
//! Talks to the camera web service over HTTP and its Socket.IO live
//! channel, and drives the terminal control surface built on top of it.

pub mod cli;
pub mod config;
pub mod labels;
pub mod network;
pub mod tui;
