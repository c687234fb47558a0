//! RenderPulse server library entry.
//!
//! This crate wires the config loader, application state, request
//! interceptor, operational and demonstration endpoints, and the heartbeat
//! emitter into a cohesive HTTP service. It is intended to be consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod heartbeat;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
