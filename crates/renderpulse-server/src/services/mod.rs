//! HTTP-facing demonstration services.

pub mod demo;
