use ::config::{Environment, File};
use eyre::Result;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{address::ACCOUNT_PREFIX, error::WalletError};

/// Base name of the optional configuration file (`wallet-client.toml`)
pub const CONFIG_FILE: &str = "wallet-client";

/// Prefix of environment overrides, e.g. `WALLET_CLIENT_SERVICE__BASE_URL`
pub const ENV_PREFIX: &str = "WALLET_CLIENT";

/// Gas prices used when neither `gas_prices` nor `fees` is configured
pub const DEFAULT_GAS_PRICES: &str = "0.015ukrw";

/// Client configuration structure
///
/// Groups every value the workflow sends to the wallet service. Defaults
/// reproduce the demo transfer against a local service on port 3000.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub chain: ChainConfig,
    pub send: SendConfig,
    pub signer: SignerConfig,
    pub workflow: WorkflowConfig,
}

/// Where the wallet service listens
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Base URL without trailing path (default: http://127.0.0.1:3000)
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChainConfig {
    /// Chain id sent with both the send and the sign request
    pub chain_id: String,

    /// Human-readable prefix expected on account addresses
    pub account_prefix: String,
}

/// Bank-send transaction parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SendConfig {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub memo: String,
    pub gas_adjustment: String,
    #[serde(default)]
    pub gas_prices: Option<String>,
    #[serde(default)]
    pub fees: Option<String>,
    #[serde(default)]
    pub gas: Option<String>,
}

/// Credentials of the key the wallet service signs with
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SignerConfig {
    pub name: String,
    pub passphrase: String,
    #[serde(deserialize_with = "u64_from_text")]
    pub account_number: u64,
    #[serde(deserialize_with = "u64_from_text")]
    pub sequence: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WorkflowConfig {
    /// Run `/tx/encode` between sign and broadcast
    #[serde(default, deserialize_with = "bool_from_text")]
    pub encode: bool,
}

// Environment values always arrive as strings. Only these fields are
// converted; every other field keeps the exact text it was given.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOr<T> {
    Value(T),
    Text(String),
}

fn u64_from_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match TextOr::<u64>::deserialize(deserializer)? {
        TextOr::Value(n) => Ok(n),
        TextOr::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("expected an unsigned integer, got {s:?}: {e}"))),
    }
}

fn bool_from_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match TextOr::<bool>::deserialize(deserializer)? {
        TextOr::Value(b) => Ok(b),
        TextOr::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(de::Error::custom(format!("expected a boolean, got {s:?}"))),
        },
    }
}

impl SendConfig {
    /// Fall back to [`DEFAULT_GAS_PRICES`] unless the transfer pays explicit fees
    fn apply_fee_default(&mut self) {
        if self.fees.is_none() && self.gas_prices.is_none() {
            self.gas_prices = Some(DEFAULT_GAS_PRICES.to_string());
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service: ServiceConfig {
                base_url: "http://127.0.0.1:3000".to_string(),
            },
            chain: ChainConfig {
                chain_id: "columbus-2".to_string(),
                account_prefix: ACCOUNT_PREFIX.to_string(),
            },
            send: SendConfig {
                sender: "terra1t849fxw7e8ney35mxemh4h3ayea4zf77dslwna".to_string(),
                receiver: "terra1v9ku44wycfnsucez6fp085f5fsksp47u9x8jr4".to_string(),
                amount: "1000000uluna".to_string(),
                memo: "937767194".to_string(),
                gas_adjustment: "1.4".to_string(),
                gas_prices: Some(DEFAULT_GAS_PRICES.to_string()),
                fees: None,
                gas: None,
            },
            signer: SignerConfig {
                name: "tmp".to_string(),
                passphrase: "12345678".to_string(),
                account_number: 93,
                sequence: 64,
            },
            workflow: WorkflowConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, `wallet-client.toml` and the environment
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - Configuration structure or error
    ///
    /// # Environment Variables
    ///
    /// Any field can be overridden as `WALLET_CLIENT_<SECTION>__<FIELD>`, e.g.
    /// `WALLET_CLIENT_SERVICE__BASE_URL` or `WALLET_CLIENT_WORKFLOW__ENCODE=true`.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (useful for development)
        let _ = dotenv::dotenv();

        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`Config::load`] with an explicit file name and no `.env` lookup
    ///
    /// # Arguments
    ///
    /// * `file` - File name with or without extension; a missing file is skipped
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - Validated configuration or error
    pub fn load_from(file: &str) -> Result<Self> {
        // Gas prices are left unset in the default layer so a file or the
        // environment can choose fees instead; the default is filled in below.
        let mut defaults = Config::default();
        defaults.send.gas_prices = None;

        // Later sources override earlier ones: defaults, file, environment.
        // Environment values are not type-parsed, so passphrases and memos
        // made of digits reach the service exactly as written.
        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&defaults)?)
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.send.apply_fee_default();
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the wallet service would refuse anyway
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.service.base_url.trim().is_empty() {
            return Err(WalletError::Config("service.base_url must not be empty".to_string()));
        }
        if self.chain.account_prefix.is_empty() {
            return Err(WalletError::Config("chain.account_prefix must not be empty".to_string()));
        }
        if self.send.fees.is_some() && self.send.gas_prices.is_some() {
            return Err(WalletError::Config(
                "send.gas_prices and send.fees cannot be used at the same time".to_string(),
            ));
        }
        Ok(())
    }
}
