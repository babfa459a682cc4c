use bech32::Variant;
use tracing::debug;

/// Prefix of Terra account addresses
pub const ACCOUNT_PREFIX: &str = "terra";

/// Prefix of Terra account public keys
pub const ACCOUNT_PUBKEY_PREFIX: &str = "terrapub";

/// Prefix of validator operator addresses
pub const VALIDATOR_PREFIX: &str = "terravaloper";

/// Prefix of validator operator public keys
pub const VALIDATOR_PUBKEY_PREFIX: &str = "terravaloperpub";

/// Prefix of consensus node addresses
pub const CONSENSUS_PREFIX: &str = "terravalcons";

/// Prefix of consensus node public keys
pub const CONSENSUS_PUBKEY_PREFIX: &str = "terravalconspub";

/// Check that `addr` is a well-formed bech32 string whose human-readable
/// prefix equals `expected_prefix`
///
/// Only the encoding is checked: a `true` result says nothing about whether
/// the account exists or the payload is a valid key hash.
pub fn validate_address(addr: &str, expected_prefix: &str) -> bool {
    match bech32::decode(addr) {
        Ok((hrp, _, Variant::Bech32)) => hrp == expected_prefix,
        Ok((hrp, _, variant)) => {
            debug!("Address {} decoded with unexpected variant {:?} (prefix {})", addr, variant, hrp);
            false
        }
        Err(e) => {
            debug!("Address {} failed to decode: {}", addr, e);
            false
        }
    }
}

/// Address families the wallet service can render a key in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bech32Kind {
    Account,
    Validator,
    Consensus,
}

impl Bech32Kind {
    pub const ALL: [Bech32Kind; 3] = [Bech32Kind::Account, Bech32Kind::Validator, Bech32Kind::Consensus];

    pub fn address_prefix(self) -> &'static str {
        match self {
            Bech32Kind::Account => ACCOUNT_PREFIX,
            Bech32Kind::Validator => VALIDATOR_PREFIX,
            Bech32Kind::Consensus => CONSENSUS_PREFIX,
        }
    }

    pub fn pubkey_prefix(self) -> &'static str {
        match self {
            Bech32Kind::Account => ACCOUNT_PUBKEY_PREFIX,
            Bech32Kind::Validator => VALIDATOR_PUBKEY_PREFIX,
            Bech32Kind::Consensus => CONSENSUS_PUBKEY_PREFIX,
        }
    }

    /// Value of the `bech` query parameter on `GET /keys/{name}`
    pub fn query_param(self) -> &'static str {
        match self {
            Bech32Kind::Account => "acc",
            Bech32Kind::Validator => "val",
            Bech32Kind::Consensus => "cons",
        }
    }

    /// Family of a well-formed Terra address, `None` for anything else
    pub fn classify(addr: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| validate_address(addr, kind.address_prefix()))
    }
}
