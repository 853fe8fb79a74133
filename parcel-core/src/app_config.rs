use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default = "default_buyers")]
    pub buyers: Vec<BuyerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delivery: DeliveryConfig::default(),
            log: LogConfig::default(),
            buyers: default_buyers(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl DeliveryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { delay_ms: default_delay_ms() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: default_filter() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BuyerConfig {
    pub address: String,
}

fn default_delay_ms() -> u64 { 2000 }

fn default_filter() -> String {
    "parcel_demo=info,parcel_order=info".to_string()
}

fn default_buyers() -> Vec<BuyerConfig> {
    ["1234 Main Street", "9876 Who Cares Avenue", "1111 Unknown Address"]
        .into_iter()
        .map(|address| BuyerConfig { address: address.to_string() })
        .collect()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = config::Config::builder()
            // Every key has a default, so even the base file is optional
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `PARCEL__DELIVERY__DELAY_MS=10`
            .add_source(config::Environment::with_prefix("PARCEL").separator("__"));

        Self::from_builder(builder)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }
}
