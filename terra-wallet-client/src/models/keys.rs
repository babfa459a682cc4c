use serde::{Deserialize, Serialize};

/// Body of `GET /keys` and `GET /keys/{name}`
#[derive(Debug, Clone, Serialize)]
pub struct PasswordBody {
    pub password: String,
}

/// Key record returned by the wallet service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyOutput {
    pub name: String,

    /// Key type, e.g. `local`
    #[serde(rename = "type")]
    pub key_type: String,

    /// Bech32 address in the requested prefix family
    pub address: String,

    /// Bech32 public key in the requested prefix family
    pub pubkey: String,

    /// Only present right after key creation
    #[serde(default)]
    pub mnemonic: Option<String>,
}
