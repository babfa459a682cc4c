use eyre::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use terra_wallet_client::{
    client::WalletClient, config::Config, models::tx::EncodeResponse, workflow::Workflow,
};

/// Application entry point
///
/// This is the main function that:
/// 1. Sets up logging
/// 2. Loads configuration
/// 3. Checks the sender and receiver addresses
/// 4. Runs build, sign, (encode) and broadcast against the wallet service
/// 5. Prints the signed transaction, the base64 encoded transaction (when
///    encoding is enabled) and the broadcast result
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Info level for our client, quieter levels for the HTTP stack
    let filter = EnvFilter::from_default_env()
        .add_directive("terra_wallet_client=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let config = Config::load()?;
    info!("Using wallet service at {}", config.service.base_url);

    let client = WalletClient::new(&config.service.base_url)?;
    let workflow = Workflow::new(client, config);

    let send = &workflow.config().send;
    for (role, addr) in [("sender", &send.sender), ("receiver", &send.receiver)] {
        if !workflow.validate_address(addr) {
            error!(
                "Invalid {} address {}; expected prefix {}",
                role,
                addr,
                workflow.config().chain.account_prefix
            );
            return Ok(());
        }
    }

    let report = workflow.run().await;

    if let Some(signed) = &report.signed_tx {
        println!("{signed}");
    }
    if let Some(encoded) = &report.encoded_tx {
        // The service answers {"tx": "<base64>"}; fall back to the raw body otherwise
        match encoded.parse::<EncodeResponse>() {
            Ok(response) => println!("{}", response.tx),
            Err(e) => {
                error!("Unexpected encode response: {}", e);
                println!("{encoded}");
            }
        }
    }
    if let Some(result) = &report.broadcast {
        println!("{result}");
    }

    Ok(())
}
