//! Tencent Cloud EdgeOne API
//!
//! Hand-rolled replacement for the vendor SDK: TC3-HMAC-SHA256 signing,
//! the JSON envelope, and the two L7 access-rule actions.

pub mod client;
pub mod models;
pub mod signer;

pub use client::{TeoClient, API_VERSION, SERVICE};
pub use models::{
    DescribeL7AccRulesRequest, DescribeL7AccRulesResponse, ModifyL7AccRuleRequest,
    ModifyL7AccRuleResponse,
};
