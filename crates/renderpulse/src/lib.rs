//! Top-level facade crate for RenderPulse.
//!
//! Re-exports the metrics core and the server library so users can depend on a single crate.

pub mod core {
    pub use renderpulse_core::*;
}

pub mod server {
    pub use renderpulse_server::*;
}
