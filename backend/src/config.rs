//! Configuration management for the Material Cart backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MCART_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{LogisticsPartner, PartnerType};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Order pricing
    pub pricing: PricingConfig,

    /// Order identifier generation
    pub orders: OrderConfig,

    /// Stock reporting
    pub inventory: InventoryConfig,

    /// Audit trail
    pub audit: AuditConfig,

    /// Logistics partner rate cards
    pub logistics: LogisticsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret shared with the identity provider that issues tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    /// Reference (mandi) rate applied to every unit when totalling an order
    pub reference_unit_rate: Decimal,

    /// GST rate applied to order subtotals, in percent
    pub gst_rate_percent: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrderConfig {
    /// Prefix of human-readable order ids
    pub id_prefix: String,

    /// Attempts at a fresh id before giving up
    pub id_max_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Products below this many remaining units are flagged
    pub low_stock_threshold: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// Number of entries returned by the recent-activity listing
    pub recent_limit: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateCard {
    pub base_rate: Decimal,
    pub per_km_rate: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogisticsConfig {
    pub bike: RateCard,
    pub tempo: RateCard,
    pub truck: RateCard,
}

impl LogisticsConfig {
    /// Rate card of a partner type
    pub fn partner(&self, partner_type: PartnerType) -> LogisticsPartner {
        let card = match partner_type {
            PartnerType::Bike => &self.bike,
            PartnerType::Tempo => &self.tempo,
            PartnerType::Truck => &self.truck,
        };
        LogisticsPartner {
            partner_type,
            base_rate: card.base_rate,
            per_km_rate: card.per_km_rate,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("MCART_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder_with_defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MCART_ prefix)
            .add_source(
                Environment::with_prefix("MCART")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Defaults only, without files or environment; used by tests and tooling
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder_with_defaults("test")?
            .set_default("database.url", "postgres://localhost/materialcart")?
            .set_default("jwt.secret", "development-secret-key")?
            .build()?
            .try_deserialize()
    }

    fn builder_with_defaults(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("pricing.reference_unit_rate", "500")?
            .set_default("pricing.gst_rate_percent", "18")?
            .set_default("orders.id_prefix", "MCART")?
            .set_default("orders.id_max_attempts", 5)?
            .set_default("inventory.low_stock_threshold", shared::DEFAULT_LOW_STOCK_THRESHOLD)?
            .set_default("audit.recent_limit", 100)?
            .set_default("logistics.bike.base_rate", "50")?
            .set_default("logistics.bike.per_km_rate", "8")?
            .set_default("logistics.tempo.base_rate", "400")?
            .set_default("logistics.tempo.per_km_rate", "18")?
            .set_default("logistics.truck.base_rate", "1500")?
            .set_default("logistics.truck.per_km_rate", "45")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
