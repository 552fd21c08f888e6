//! Key-value store client for the Atlas trading platform
//!
//! A thin wrapper over the DynamoDB SDK exposing exactly the operations the
//! pipeline's correctness rests on: conditional put (idempotency records),
//! update-with-predicate (balance reservation and settlement), and plain
//! get/put. Predicate failures are business outcomes, not faults, so
//! [`StoreError::ConditionFailed`] is distinguished from transient SDK
//! errors: callers map the former to "duplicate" or "insufficient funds"
//! and let the latter propagate for re-delivery.

pub mod attrs;
pub mod config;

use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

pub use aws_sdk_dynamodb::types::AttributeValue;
pub use config::AwsConfig;

/// Store failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A conditional write's predicate did not hold (item already exists,
    /// or balance guard failed).
    #[error("condition failed")]
    ConditionFailed,

    #[error("item not found: {table}/{key}")]
    NotFound { table: String, key: String },

    #[error("store error: {0}")]
    Sdk(String),
}

impl StoreError {
    fn sdk<E: std::error::Error + Send + Sync + 'static>(
        err: aws_sdk_dynamodb::error::SdkError<E>,
    ) -> Self {
        StoreError::Sdk(DisplayErrorContext(err).to_string())
    }
}

/// DynamoDB-backed key-value store client.
#[derive(Clone)]
pub struct StoreClient {
    client: aws_sdk_dynamodb::Client,
}

impl StoreClient {
    /// Connect using the service configuration.
    ///
    /// A local endpoint override switches to static dummy credentials so a
    /// local store container accepts the requests.
    pub async fn connect(cfg: &AwsConfig) -> Self {
        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&base);
        if let Some(endpoint) = cfg.store_endpoint() {
            builder = builder
                .endpoint_url(endpoint)
                .credentials_provider(Credentials::new("dummy", "dummy", None, None, "atlas-local"));
        }

        Self {
            client: aws_sdk_dynamodb::Client::from_conf(builder.build()),
        }
    }

    /// Fetch one item by partition key; `Ok(None)` when absent.
    pub async fn get_item(
        &self,
        table: &str,
        key_attr: &str,
        key: &str,
    ) -> Result<Option<HashMap<String, AttributeValue>>, StoreError> {
        let out = self
            .client
            .get_item()
            .table_name(table)
            .key(key_attr, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(StoreError::sdk)?;
        Ok(out.item)
    }

    /// Unconditional put.
    pub async fn put_item(
        &self,
        table: &str,
        item: HashMap<String, AttributeValue>,
    ) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(StoreError::sdk)?;
        Ok(())
    }

    /// Conditional put with an `attribute_not_exists` predicate on the
    /// partition key. Returns `Ok(true)` when the item was created and
    /// `Ok(false)` when it already existed.
    pub async fn put_if_absent(
        &self,
        table: &str,
        key_attr: &str,
        item: HashMap<String, AttributeValue>,
    ) -> Result<bool, StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .condition_expression(format!("attribute_not_exists({key_attr})"))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let condition_failed = err
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if condition_failed {
                    debug!(table, "conditional put lost: item already present");
                    Ok(false)
                } else {
                    Err(StoreError::sdk(err))
                }
            }
        }
    }

    /// Update with an optional predicate. A failed predicate maps to
    /// [`StoreError::ConditionFailed`]; everything else is transient.
    pub async fn update(
        &self,
        table: &str,
        key_attr: &str,
        key: &str,
        update_expr: &str,
        condition_expr: Option<&str>,
        names: HashMap<String, String>,
        values: HashMap<String, AttributeValue>,
    ) -> Result<(), StoreError> {
        let mut req = self
            .client
            .update_item()
            .table_name(table)
            .key(key_attr, AttributeValue::S(key.to_string()))
            .update_expression(update_expr);
        if let Some(cond) = condition_expr {
            req = req.condition_expression(cond);
        }
        if !names.is_empty() {
            req = req.set_expression_attribute_names(Some(names));
        }
        if !values.is_empty() {
            req = req.set_expression_attribute_values(Some(values));
        }

        match req.send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let condition_failed = err
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if condition_failed {
                    Err(StoreError::ConditionFailed)
                } else {
                    Err(StoreError::sdk(err))
                }
            }
        }
    }

    /// Connectivity probe used by debug endpoints.
    pub async fn describe_table(&self, table: &str) -> Result<(), StoreError> {
        self.client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(StoreError::sdk)?;
        Ok(())
    }
}
