use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    address::Bech32Kind,
    error::WalletError,
    models::{
        keys::{KeyOutput, PasswordBody},
        tx::{BankSendBody, EncodeBody, ResponseBody, SignBody},
    },
};

pub const BANK_SEND_PATH: &str = "/tx/bank/send";
pub const SIGN_PATH: &str = "/tx/sign";
pub const ENCODE_PATH: &str = "/tx/encode";
pub const BROADCAST_PATH: &str = "/tx/broadcast";
pub const VERSION_PATH: &str = "/version";
pub const KEYS_PATH: &str = "/keys";

/// Transaction routes of the wallet service
///
/// The workflow only talks to the service through this trait, so its
/// sequencing can be tested without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletApi {
    async fn bank_send(&self, body: &BankSendBody) -> Result<ResponseBody, WalletError>;

    async fn sign(&self, body: &SignBody) -> Result<ResponseBody, WalletError>;

    async fn encode(&self, body: &EncodeBody) -> Result<ResponseBody, WalletError>;

    /// Post an already signed transaction exactly as the sign step returned it
    async fn broadcast(&self, signed_tx: &ResponseBody) -> Result<ResponseBody, WalletError>;
}

/// HTTP client for the wallet service
///
/// Idle connections are not pooled: each call opens its own connection,
/// and that connection is gone once the response body has been read.
#[derive(Clone)]
pub struct WalletClient {
    http: reqwest::Client,
    base_url: String,
}

impl WalletClient {
    /// Create a client for the service at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme, host and port, e.g. `http://127.0.0.1:3000`
    pub fn new(base_url: &str) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ResponseBody, WalletError> {
        let body = serde_json::to_string(body)?;
        self.post_raw(path, body).await
    }

    async fn post_raw(&self, path: &str, body: String) -> Result<ResponseBody, WalletError> {
        let request = self
            .http
            .post(self.endpoint(path))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        execute(request).await
    }

    /// Fetch the service version string
    #[instrument(skip(self), fields(base_url = %self.base_url), err)]
    pub async fn version(&self) -> Result<ResponseBody, WalletError> {
        execute(self.http.get(self.endpoint(VERSION_PATH))).await
    }

    /// List every key the service holds under `password`
    #[instrument(skip(self, password), fields(base_url = %self.base_url), err)]
    pub async fn list_keys(&self, password: &str) -> Result<Vec<KeyOutput>, WalletError> {
        let request = self.http.get(self.endpoint(KEYS_PATH)).json(&PasswordBody {
            password: password.to_string(),
        });
        execute(request).await?.parse()
    }

    /// Look up one key, rendered in the address family `kind`
    ///
    /// The service answers 404 when no key named `name` exists and 401/500
    /// when `password` does not open the keyring. Both come back as
    /// [`WalletError::Service`] with the service's error body attached.
    ///
    /// # Arguments
    ///
    /// * `name` - Key name in the service's keyring
    /// * `password` - Keyring password, sent in the request body
    /// * `kind` - Address family for `address` and `pubkey` (`bech=acc|val|cons`)
    ///
    /// # Returns
    ///
    /// * `Result<KeyOutput, WalletError>` - The key record or an error
    #[instrument(skip(self, password), fields(base_url = %self.base_url), err)]
    pub async fn get_key(
        &self,
        name: &str,
        password: &str,
        kind: Bech32Kind,
    ) -> Result<KeyOutput, WalletError> {
        // GET with a JSON body, as the service reads the password from it
        let request = self
            .http
            .get(self.endpoint(&format!("{KEYS_PATH}/{name}")))
            .query(&[("bech", kind.query_param())])
            .json(&PasswordBody {
                password: password.to_string(),
            });
        // Decode only after the status check so a 404 stays a service error
        execute(request).await?.parse()
    }
}

/// Send a request and read the whole body before looking at the status
///
/// Only 200 counts as success. Any other status, including the rest of the
/// 2xx range, becomes [`WalletError::Service`] with the body kept for logging.
/// Connect and read failures become [`WalletError::Transport`].
///
/// # Arguments
///
/// * `request` - Fully built request for one wallet route
///
/// # Returns
///
/// * `Result<ResponseBody, WalletError>` - The raw body on 200, or an error
async fn execute(request: RequestBuilder) -> Result<ResponseBody, WalletError> {
    // Connection refused or reset surfaces here as a transport error
    let response = request.send().await?;
    let status = response.status();

    // Drain the body first so the connection is released on every path
    let body = response.text().await?;
    debug!("Wallet service answered {} with {} bytes", status, body.len());

    if status != StatusCode::OK {
        return Err(WalletError::Service {
            status: status.as_u16(),
            body,
        });
    }
    Ok(ResponseBody(body))
}

#[async_trait]
impl WalletApi for WalletClient {
    #[instrument(skip(self, body), fields(base_url = %self.base_url), err)]
    async fn bank_send(&self, body: &BankSendBody) -> Result<ResponseBody, WalletError> {
        self.post_json(BANK_SEND_PATH, body).await
    }

    #[instrument(skip(self, body), fields(base_url = %self.base_url), err)]
    async fn sign(&self, body: &SignBody) -> Result<ResponseBody, WalletError> {
        self.post_json(SIGN_PATH, body).await
    }

    #[instrument(skip(self, body), fields(base_url = %self.base_url), err)]
    async fn encode(&self, body: &EncodeBody) -> Result<ResponseBody, WalletError> {
        self.post_json(ENCODE_PATH, body).await
    }

    #[instrument(skip(self, signed_tx), fields(base_url = %self.base_url), err)]
    async fn broadcast(&self, signed_tx: &ResponseBody) -> Result<ResponseBody, WalletError> {
        // Reject non-JSON before it leaves the process, then send the text unchanged
        signed_tx.to_raw_value()?;
        self.post_raw(BROADCAST_PATH, signed_tx.as_str().to_string()).await
    }
}
