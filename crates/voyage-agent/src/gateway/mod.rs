//! Transport surfaces: HTTP message gateway and a local stdio loop.

mod http;
mod stdio;

pub use http::{router, run_http, validate_activity, GatewayState, HealthResponse, TurnResponse};
pub use stdio::{run_stdio, DEFAULT_STDIO_SESSION_ID};
