// Configuration types of a database receiver, described for derivation.
// Compiled into the integration tests and also read back as source text so
// field documentation can be extracted from it.

use std::collections::HashMap;
use std::time::Duration;

use confschema_reflect::{Describe, FieldDescriptor, TypeGraph, TypeId};

pub const MODULE: &str = "testreceiver::config";

/// Connection settings for the source database.
#[allow(dead_code)]
pub struct DatabaseConfig {
    /// Hostname of the database server.
    pub host: String,
    pub port: u16, // TCP port of the database server.
    pub username: String,
    pub password: String,
    /// Documented, but durations keep their fixed description.
    pub timeout: Duration,
}

impl Describe for DatabaseConfig {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe_record::<Self>("DatabaseConfig", MODULE, |g| {
            vec![
                FieldDescriptor::new("host", g.describe::<String>()),
                FieldDescriptor::new("port", g.describe::<u16>()),
                FieldDescriptor::new("username", g.describe::<String>()),
                FieldDescriptor::new("password", g.describe::<String>()),
                FieldDescriptor::new("timeout", g.describe::<Duration>()),
            ]
        })
    }
}

/// HTTP server settings.
#[allow(dead_code)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub endpoint: String,
    pub max_request_body_size: Option<i64>,
}

impl Describe for ServerConfig {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe_record::<Self>("ServerConfig", "testreceiver::confighttp", |g| {
            vec![
                FieldDescriptor::new("endpoint", g.describe::<String>()),
                FieldDescriptor::new("max_request_body_size", g.describe::<Option<i64>>()),
            ]
        })
    }
}

/// A section that may be left out of the configuration entirely.
#[allow(dead_code)]
pub struct Optional<T> {
    value: T,
    flavor: u8,
}

impl<T: Describe> Describe for Optional<T> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe_record::<Self>("Optional", "testreceiver::configoptional", |g| {
            vec![
                FieldDescriptor::new("value", g.describe::<T>()).private(),
                FieldDescriptor::new("flavor", g.describe::<u8>()).private(),
            ]
        })
    }
}

/// Settings shared by every component.
#[allow(dead_code)]
pub struct ComponentSettings {
    /// Identifier reported in telemetry.
    pub component_id: Option<String>,
}

impl Describe for ComponentSettings {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe_record::<Self>("ComponentSettings", MODULE, |g| {
            vec![FieldDescriptor::new("component_id", g.describe::<Option<String>>())]
        })
    }
}

/// Top-level receiver configuration.
#[allow(dead_code)]
pub struct TestReceiverConfig {
    /// Database to collect from.
    pub database: DatabaseConfig,
    /// Optional HTTP server exposing collected data.
    pub http_server: Optional<ServerConfig>,
    pub collection_interval: Duration, // How often to collect.
    pub batch_size: i32,
    pub enable_tracing: bool,
    pub log_level: String,
    pub include_tables: Vec<String>,
    pub table_aliases: HashMap<String, String>,
    pub settings: ComponentSettings,
    pub extensions: serde_json::Value,
}

impl Describe for TestReceiverConfig {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe_record::<Self>("TestReceiverConfig", MODULE, |g| {
            vec![
                FieldDescriptor::new("database", g.describe::<DatabaseConfig>()),
                FieldDescriptor::new("http_server", g.describe::<Optional<ServerConfig>>()),
                FieldDescriptor::new("collection_interval", g.describe::<Duration>()),
                FieldDescriptor::new("batch_size", g.describe::<i32>()),
                FieldDescriptor::new("enable_tracing", g.describe::<bool>()),
                FieldDescriptor::new("log_level", g.describe::<String>())
                    .omit_empty()
                    .describe("Minimum level of emitted logs."),
                FieldDescriptor::new("include_tables", g.describe::<Vec<String>>()).omit_empty(),
                FieldDescriptor::new("table_aliases", g.describe::<HashMap<String, String>>()).omit_empty(),
                FieldDescriptor::embedded("settings", g.describe::<ComponentSettings>()),
                FieldDescriptor::embedded("extensions", g.describe::<serde_json::Value>()),
            ]
        })
    }
}
