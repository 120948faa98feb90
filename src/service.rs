//! Access Rule Service
//!
//! Trait-based seam between the HTTP routes and the remote API. A
//! `ClientFactory` builds a fresh `AccessRuleApi` handle for every call; the
//! production factory reads credentials from the environment and returns a
//! signed `TeoClient`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::TeoConfig;
use crate::error::TeoError;
use crate::teo::{
    DescribeL7AccRulesRequest, DescribeL7AccRulesResponse, ModifyL7AccRuleRequest,
    ModifyL7AccRuleResponse, TeoClient,
};

/// The two remote calls the gateway forwards
#[async_trait]
pub trait AccessRuleApi: Send + Sync {
    /// `DescribeL7AccRules`
    async fn describe_rules(
        &self,
        request: DescribeL7AccRulesRequest,
    ) -> Result<DescribeL7AccRulesResponse, TeoError>;

    /// `ModifyL7AccRule`
    async fn modify_rule(
        &self,
        request: ModifyL7AccRuleRequest,
    ) -> Result<ModifyL7AccRuleResponse, TeoError>;
}

/// Builds one remote client per call
pub trait ClientFactory: Send + Sync {
    fn client(&self) -> Result<Box<dyn AccessRuleApi>, TeoError>;
}

#[async_trait]
impl AccessRuleApi for TeoClient {
    async fn describe_rules(
        &self,
        request: DescribeL7AccRulesRequest,
    ) -> Result<DescribeL7AccRulesResponse, TeoError> {
        self.describe_l7_acc_rules(&request).await
    }

    async fn modify_rule(
        &self,
        request: ModifyL7AccRuleRequest,
    ) -> Result<ModifyL7AccRuleResponse, TeoError> {
        self.modify_l7_acc_rule(&request).await
    }
}

// ============================================================
// Environment-backed factory
// ============================================================

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Reads `TEO_*` settings on every call and returns a new `TeoClient`
pub struct EnvClientFactory {
    /// `None` reads the process environment
    lookup: Option<Arc<Lookup>>,
}

impl EnvClientFactory {
    /// Factory over the process environment
    pub fn new() -> Self {
        Self { lookup: None }
    }

    /// Factory over a custom key lookup
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Some(Arc::new(lookup)),
        }
    }
}

impl Default for EnvClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientFactory for EnvClientFactory {
    fn client(&self) -> Result<Box<dyn AccessRuleApi>, TeoError> {
        let config = match &self.lookup {
            Some(lookup) => TeoConfig::from_lookup(|key| lookup(key))?,
            None => TeoConfig::from_env()?,
        };
        debug!(
            "Building EdgeOne client (endpoint: {}, region: {})",
            config.endpoint, config.region
        );
        Ok(Box::new(TeoClient::new(&config)?))
    }
}

// ============================================================
// Service
// ============================================================

/// Forwards access-rule operations to a freshly built client
#[derive(Clone)]
pub struct AccessRuleService {
    factory: Arc<dyn ClientFactory>,
}

impl AccessRuleService {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    /// All access rules of a zone
    pub async fn get_access_rules(
        &self,
        request: DescribeL7AccRulesRequest,
    ) -> Result<DescribeL7AccRulesResponse, TeoError> {
        info!("Listing access rules for zone: {}", request.zone_id);

        let response = self.factory.client()?.describe_rules(request).await?;

        info!(
            "Listed {} access rules (RequestId: {})",
            response.total_count().unwrap_or_default(),
            response.request_id().unwrap_or("-")
        );
        Ok(response)
    }

    /// Apply a rule modification as-is
    pub async fn update_access_rule(
        &self,
        request: ModifyL7AccRuleRequest,
    ) -> Result<ModifyL7AccRuleResponse, TeoError> {
        info!(
            "Updating access rule {} in zone {}",
            request.rule_id().unwrap_or("-"),
            request.zone_id().unwrap_or("-")
        );

        let response = self.factory.client()?.modify_rule(request).await?;

        info!(
            "Access rule updated (RequestId: {})",
            response.request_id().unwrap_or("-")
        );
        Ok(response)
    }
}
