//! EdgeOne Access Rule Gateway
//!
//! Thin HTTP gateway in front of the Tencent Cloud EdgeOne (`teo`) API.
//! Lists and updates L7 access-control rules by forwarding each request to
//! the remote API with a freshly signed client. Nothing is cached, retried
//! or rewritten on the way through.
//!
//! ## Routes
//!
//! - `GET /` - echo the inbound request headers
//! - `GET /health` - liveness probe
//! - `GET /access_rules/get_rules/:zone_id` - `DescribeL7AccRules`
//! - `PUT /access_rules/update_source` - `ModifyL7AccRule`
//!
//! ## Credentials
//!
//! `TEO_SECRET_ID`, `TEO_SECRET_KEY` and `TEO_REGION` are read from the
//! environment on every request, never at startup.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod teo;

pub use config::TeoConfig;
pub use error::{AppError, TeoError};
pub use routes::{router, AppState};
pub use service::{AccessRuleApi, AccessRuleService, ClientFactory, EnvClientFactory};
pub use teo::TeoClient;
