use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::WalletError;

/// Raw JSON text returned by the wallet service
///
/// The client never interprets transactions. It keeps the text exactly as the
/// service wrote it and hands it to the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody(pub String);

impl ResponseBody {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the body into a typed response
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, WalletError> {
        Ok(serde_json::from_str(&self.0)?)
    }

    /// Check the body is a single JSON document and wrap it for embedding
    ///
    /// The bytes are kept as-is, so the next request carries the body verbatim.
    pub fn to_raw_value(&self) -> Result<Box<RawValue>, WalletError> {
        RawValue::from_string(self.0.clone()).map_err(|e| {
            WalletError::InvalidPayload(format!("response is not a JSON document: {e}"))
        })
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResponseBody {
    fn from(body: String) -> Self {
        Self(body)
    }
}

impl From<&str> for ResponseBody {
    fn from(body: &str) -> Self {
        Self(body.to_string())
    }
}

/// Body of `POST /tx/bank/send`
///
/// Field names follow the wallet service, including its `reciever` spelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankSendBody {
    /// Bech32 account address of the sender
    pub sender: String,

    /// Bech32 account address of the receiver
    #[serde(rename = "reciever")]
    pub receiver: String,

    /// Coins to send, e.g. `1000000uluna`
    pub amount: String,

    pub memo: String,

    pub chain_id: String,

    /// Multiplier applied to simulated gas, as a decimal string
    pub gas_adjustment: String,

    /// Gas prices, e.g. `0.015ukrw`; exclusive with `fees`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_prices: Option<String>,

    /// Explicit fees; exclusive with `gas_prices`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<String>,

    /// Explicit gas limit; the service simulates when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

/// Body of `POST /tx/sign`
#[derive(Debug, Clone, Serialize)]
pub struct SignBody {
    /// Unsigned transaction returned by the send step
    pub tx: Box<RawValue>,
    pub name: String,
    pub passphrase: String,
    pub chain_id: String,
    /// Decimal string; the service parses it itself
    pub account_number: String,
    /// Decimal string; the service parses it itself
    pub sequence: String,
}

/// Body of `POST /tx/encode`
#[derive(Debug, Clone, Serialize)]
pub struct EncodeBody {
    pub tx: Box<RawValue>,
}

/// Response of `POST /tx/encode`
#[derive(Debug, Clone, Deserialize)]
pub struct EncodeResponse {
    /// Base64 of the amino-encoded transaction
    pub tx: String,
}
