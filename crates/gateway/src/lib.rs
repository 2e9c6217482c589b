//! Gateway: HTTP server exposing provider token status.
//!
//! Lifecycle:
//! 1. Validate config and build provider clients (private key parsed once)
//! 2. Bind address, print startup banner
//! 3. Serve `GET /` (provider report) and `GET /health`
//!
//! Each `GET /` re-runs both provider flows; nothing is cached.

pub mod report;
pub mod server;
pub mod state;

pub use {
    report::{GatewayReport, ProviderReport, collect_report, run_aplos_flow},
    server::{build_gateway_app, start_gateway},
    state::{GatewayState, build_http_client},
};
