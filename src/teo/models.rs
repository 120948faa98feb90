//! EdgeOne L7 Access Rule Shapes
//!
//! Request and response bodies for `DescribeL7AccRules` and `ModifyL7AccRule`.
//! The gateway does not own these shapes. Everything it passes through is
//! carried as raw JSON so nulls, absent fields and unexpected types reach the
//! other side exactly as sent; the accessors below only read fields for logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `DescribeL7AccRules` input, built by the gateway from the route
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeL7AccRulesRequest {
    pub zone_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

impl DescribeL7AccRulesRequest {
    pub fn for_zone(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            ..Default::default()
        }
    }
}

/// `DescribeL7AccRules` output (the inner `Response` object), untouched
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DescribeL7AccRulesResponse(pub Value);

impl DescribeL7AccRulesResponse {
    pub fn total_count(&self) -> Option<i64> {
        self.0.get("TotalCount").and_then(Value::as_i64)
    }

    pub fn request_id(&self) -> Option<&str> {
        request_id(&self.0)
    }
}

/// `ModifyL7AccRule` input, as received on `PUT /access_rules/update_source`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ModifyL7AccRuleRequest(pub Value);

impl ModifyL7AccRuleRequest {
    pub fn zone_id(&self) -> Option<&str> {
        self.0.get("ZoneId").and_then(Value::as_str)
    }

    /// `Rule.RuleId`, if present
    pub fn rule_id(&self) -> Option<&str> {
        self.0
            .get("Rule")
            .and_then(|rule| rule.get("RuleId"))
            .and_then(Value::as_str)
    }
}

/// `ModifyL7AccRule` output (the inner `Response` object), untouched
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ModifyL7AccRuleResponse(pub Value);

impl ModifyL7AccRuleResponse {
    pub fn request_id(&self) -> Option<&str> {
        request_id(&self.0)
    }
}

fn request_id(response: &Value) -> Option<&str> {
    response.get("RequestId").and_then(Value::as_str)
}
