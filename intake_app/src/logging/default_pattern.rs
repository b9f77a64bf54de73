//! Defines a `"default"` [`PatternEncoder`].
//!
//! Saves repeating the pattern in every appender of the configuration.

use log4rs::config::{Deserialize, Deserializers};
use log4rs::encode::Encode;
use log4rs::encode::pattern::PatternEncoder;

const fn default_true() -> bool {
    true
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultPatternConfig {
    /// Prefix every line with the UTC time.
    #[serde(default = "default_true")]
    time: bool,
    /// Include the log target, e.g. `intake::audit`.
    #[serde(default = "default_true")]
    target: bool,
}

pub struct DefaultPatternDeserializer;

impl Deserialize for DefaultPatternDeserializer {
    type Trait = dyn Encode;
    type Config = DefaultPatternConfig;

    fn deserialize(
        &self,
        config: Self::Config,
        _deserializers: &Deserializers,
    ) -> anyhow::Result<Box<Self::Trait>> {
        Ok(Box::new(PatternEncoder::new(pattern(&config))))
    }
}

fn pattern(config: &DefaultPatternConfig) -> &'static str {
    match (config.time, config.target) {
        (true, true) => "[{d(%Y-%m-%d %H:%M:%S)(utc)} {h({l:<5})} {t}] {m}{n}",
        (true, false) => "[{d(%Y-%m-%d %H:%M:%S)(utc)} {h({l:<5})}] {m}{n}",
        (false, true) => "[{h({l:<5})} {t}] {m}{n}",
        (false, false) => "[{h({l:<5})}] {m}{n}",
    }
}
