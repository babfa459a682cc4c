use std::fmt;

use tracing::{error, info, instrument};

use crate::{
    address::validate_address,
    client::{WalletApi, BANK_SEND_PATH, BROADCAST_PATH, ENCODE_PATH, SIGN_PATH},
    config::Config,
    error::WalletError,
    models::tx::{BankSendBody, EncodeBody, ResponseBody, SignBody},
};

/// One request of the send workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BankSend,
    Sign,
    Encode,
    Broadcast,
}

impl Step {
    /// Route the step posts to
    pub fn path(self) -> &'static str {
        match self {
            Step::BankSend => BANK_SEND_PATH,
            Step::Sign => SIGN_PATH,
            Step::Encode => ENCODE_PATH,
            Step::Broadcast => BROADCAST_PATH,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::BankSend => "bank send",
            Step::Sign => "sign",
            Step::Encode => "encode",
            Step::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

/// The step that stopped a run and why
#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub error: WalletError,
}

impl StepFailure {
    fn at(step: Step) -> impl FnOnce(WalletError) -> StepFailure {
        move |error| StepFailure { step, error }
    }
}

/// Everything one run produced
///
/// Steps after a failure never run, so their fields stay `None`.
#[derive(Debug, Default)]
pub struct WorkflowReport {
    /// Steps that returned 200, in the order they ran
    pub completed: Vec<Step>,
    pub unsigned_tx: Option<ResponseBody>,
    pub signed_tx: Option<ResponseBody>,
    pub encoded_tx: Option<ResponseBody>,
    pub broadcast: Option<ResponseBody>,
    pub failure: Option<StepFailure>,
}

impl WorkflowReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.broadcast.is_some()
    }
}

/// Send workflow against a wallet service
///
/// Runs bank send, sign, the optional encode, and broadcast strictly in
/// that order. Each step gets the body of the one before it.
pub struct Workflow<A> {
    api: A,
    config: Config,
}

impl<A: WalletApi> Workflow<A> {
    pub fn new(api: A, config: Config) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request body for the bank send step, taken from configuration
    pub fn bank_send_body(&self) -> BankSendBody {
        let send = &self.config.send;
        BankSendBody {
            sender: send.sender.clone(),
            receiver: send.receiver.clone(),
            amount: send.amount.clone(),
            memo: send.memo.clone(),
            chain_id: self.config.chain.chain_id.clone(),
            gas_adjustment: send.gas_adjustment.clone(),
            gas_prices: send.gas_prices.clone(),
            fees: send.fees.clone(),
            gas: send.gas.clone(),
        }
    }

    /// Ask the service to build the unsigned bank-send transaction
    pub async fn build_send_transaction(&self) -> Result<ResponseBody, WalletError> {
        self.api.bank_send(&self.bank_send_body()).await
    }

    /// Have the service sign `tx` with the configured key
    pub async fn sign_transaction(&self, tx: &ResponseBody) -> Result<ResponseBody, WalletError> {
        let signer = &self.config.signer;
        let body = SignBody {
            tx: tx.to_raw_value()?,
            name: signer.name.clone(),
            passphrase: signer.passphrase.clone(),
            chain_id: self.config.chain.chain_id.clone(),
            account_number: signer.account_number.to_string(),
            sequence: signer.sequence.to_string(),
        };
        self.api.sign(&body).await
    }

    /// Have the service amino-encode a signed transaction
    pub async fn encode_transaction(&self, signed_tx: &ResponseBody) -> Result<ResponseBody, WalletError> {
        let body = EncodeBody {
            tx: signed_tx.to_raw_value()?,
        };
        self.api.encode(&body).await
    }

    /// Submit a signed transaction to the network through the service
    pub async fn broadcast_transaction(&self, signed_tx: &ResponseBody) -> Result<ResponseBody, WalletError> {
        self.api.broadcast(signed_tx).await
    }

    /// Whether `addr` is a bech32 account address for the configured chain
    pub fn validate_address(&self, addr: &str) -> bool {
        validate_address(addr, &self.config.chain.account_prefix)
    }

    /// Run the whole workflow once
    ///
    /// Posts bank send, sign, encode (when `workflow.encode` is set) and
    /// broadcast, one after another. The next request is only issued once the
    /// previous one has returned 200.
    ///
    /// A failing step is logged with its route and, for service errors, the
    /// status code and response body. It is then recorded in the report and
    /// nothing after it is requested. Failures never panic or abort the process.
    ///
    /// # Returns
    ///
    /// * `WorkflowReport` - Bodies of every completed step, plus the failure if any
    #[instrument(skip(self), fields(encode = self.config.workflow.encode))]
    pub async fn run(&self) -> WorkflowReport {
        let mut report = WorkflowReport::default();

        match self.drive(&mut report).await {
            Ok(()) => info!("Workflow finished after {} steps", report.completed.len()),
            Err(failure) => {
                // Service errors carry the body the wallet wrote; log it as-is
                match &failure.error {
                    WalletError::Service { status, body } => {
                        error!(
                            "Failed to {} ({}); status code {}",
                            failure.step,
                            failure.step.path(),
                            status
                        );
                        error!("Response: {}", body);
                    }
                    other => error!("Failed to {} ({}): {}", failure.step, failure.step.path(), other),
                }
                report.failure = Some(failure);
            }
        }

        report
    }

    /// Issue the steps in order, filling `report` as each one succeeds
    ///
    /// # Arguments
    ///
    /// * `report` - Receives each step's body as soon as it returns
    ///
    /// # Returns
    ///
    /// * `Result<(), StepFailure>` - The first step that failed, tagged with its error
    async fn drive(&self, report: &mut WorkflowReport) -> Result<(), StepFailure> {
        // Build the unsigned transaction from the configured transfer
        let unsigned = self
            .build_send_transaction()
            .await
            .map_err(StepFailure::at(Step::BankSend))?;
        report.completed.push(Step::BankSend);
        let unsigned = report.unsigned_tx.insert(unsigned);

        // Sign it; the unsigned body is embedded verbatim under "tx"
        let signed = self
            .sign_transaction(unsigned)
            .await
            .map_err(StepFailure::at(Step::Sign))?;
        report.completed.push(Step::Sign);
        let signed = report.signed_tx.insert(signed).clone();

        // Optional encode; its result is only reported, broadcast still gets the signed tx
        if self.config.workflow.encode {
            let encoded = self
                .encode_transaction(&signed)
                .await
                .map_err(StepFailure::at(Step::Encode))?;
            report.completed.push(Step::Encode);
            report.encoded_tx = Some(encoded);
        }

        // Broadcast the signed transaction exactly as the sign step returned it
        let result = self
            .broadcast_transaction(&signed)
            .await
            .map_err(StepFailure::at(Step::Broadcast))?;
        report.completed.push(Step::Broadcast);
        report.broadcast = Some(result);

        Ok(())
    }
}
