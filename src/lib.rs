//! Range-aware media gateway in front of an object store.
//!
//! `mediagate` serves stored media over HTTP with long-lived cache headers,
//! permissive CORS, ETag propagation, and single-range `Range` support so
//! browser video players can seek without downloading whole files.
//!
//! - [`gateway`]: the request handler, independent of any server runtime
//! - [`store`]: the object store trait plus memory and filesystem backends
//! - [`server`]: a hyper server that runs the gateway
//! - [`config`], [`logging`], [`metrics`]: the ambient service plumbing

pub mod commands;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod store;

pub use gateway::MediaGateway;
pub use server::Server;
