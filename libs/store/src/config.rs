//! Environment-driven service configuration
//!
//! Every service loads the same configuration at startup and logs the
//! resolved values once, so a misconfigured table name or endpoint is
//! visible in the first lines of output.

use tracing::info;

const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8000";

/// AWS and bus configuration shared by all services.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    pub balances_table: String,
    pub orders_table: String,
    pub idempotency_table: String,
    pub audit_bucket: String,
    pub ddb_endpoint: Option<String>,
    pub use_local_ddb: bool,
    pub kafka_brokers: Vec<String>,
}

impl AwsConfig {
    /// Load from process environment, logging the resolved settings.
    pub fn load(service_name: &str) -> Self {
        let cfg = Self::from_lookup(&|key| std::env::var(key).ok());

        info!(service = service_name, region = %cfg.region, "starting with AWS config");
        info!(service = service_name, balances_table = %cfg.balances_table, orders_table = %cfg.orders_table, idempotency_table = %cfg.idempotency_table, "store tables");
        info!(service = service_name, audit_bucket = %cfg.audit_bucket, brokers = ?cfg.kafka_brokers, "audit bucket and brokers");
        match cfg.store_endpoint() {
            Some(endpoint) => {
                info!(service = service_name, %endpoint, "store endpoint override enabled")
            }
            None => info!(service = service_name, "store endpoint override disabled"),
        }

        cfg
    }

    /// Build from an arbitrary variable lookup (testable without touching
    /// the process environment).
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, fallback: &str| lookup(key).unwrap_or_else(|| fallback.to_string());

        Self {
            region: get("AWS_REGION", "us-east-1"),
            balances_table: get("ATLAS_DDB_BALANCES_TABLE", "atlas_balances"),
            orders_table: get("ATLAS_DDB_ORDERS_TABLE", "atlas_orders"),
            idempotency_table: get("ATLAS_DDB_IDEMPOTENCY_TABLE", "atlas_idempotency"),
            audit_bucket: get("ATLAS_AUDIT_S3_BUCKET", "atlas-audit-demo"),
            ddb_endpoint: lookup("ATLAS_DDB_ENDPOINT").filter(|s| !s.is_empty()),
            use_local_ddb: lookup("ATLAS_USE_DDB_LOCAL")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            kafka_brokers: get("ATLAS_KAFKA_BROKERS", "localhost:19092")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Effective store endpoint: the explicit override, or the local
    /// default when the local shortcut is set.
    pub fn store_endpoint(&self) -> Option<&str> {
        match (&self.ddb_endpoint, self.use_local_ddb) {
            (Some(endpoint), _) => Some(endpoint),
            (None, true) => Some(DEFAULT_LOCAL_ENDPOINT),
            (None, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let cfg = AwsConfig::from_lookup(&lookup_from(HashMap::new()));
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.balances_table, "atlas_balances");
        assert_eq!(cfg.orders_table, "atlas_orders");
        assert_eq!(cfg.idempotency_table, "atlas_idempotency");
        assert_eq!(cfg.audit_bucket, "atlas-audit-demo");
        assert_eq!(cfg.kafka_brokers, vec!["localhost:19092".to_string()]);
        assert_eq!(cfg.store_endpoint(), None);
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let cfg = AwsConfig::from_lookup(&lookup_from(HashMap::from([
            ("ATLAS_DDB_ENDPOINT", "http://ddb:9000"),
            ("ATLAS_USE_DDB_LOCAL", "true"),
        ])));
        assert_eq!(cfg.store_endpoint(), Some("http://ddb:9000"));
    }

    #[test]
    fn test_local_shortcut() {
        let cfg = AwsConfig::from_lookup(&lookup_from(HashMap::from([(
            "ATLAS_USE_DDB_LOCAL",
            "TRUE",
        )])));
        assert!(cfg.use_local_ddb);
        assert_eq!(cfg.store_endpoint(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_broker_list_parsing() {
        let cfg = AwsConfig::from_lookup(&lookup_from(HashMap::from([(
            "ATLAS_KAFKA_BROKERS",
            "kafka-1:9092, kafka-2:9092",
        )])));
        assert_eq!(
            cfg.kafka_brokers,
            vec!["kafka-1:9092".to_string(), "kafka-2:9092".to_string()]
        );
    }

    #[test]
    fn test_table_overrides() {
        let cfg = AwsConfig::from_lookup(&lookup_from(HashMap::from([(
            "ATLAS_DDB_BALANCES_TABLE",
            "balances_test",
        )])));
        assert_eq!(cfg.balances_table, "balances_test");
        assert_eq!(cfg.orders_table, "atlas_orders");
    }
}
