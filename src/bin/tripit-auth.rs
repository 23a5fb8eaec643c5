//! Interactive generator for TripIt OAuth access tokens.
//!
//! Runs the out-of-band login once and prints the resulting token pair in
//! `.env` form.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tripit_oauth1::{Config, TripIt, DEFAULT_API_BASE};

#[derive(Parser, Debug)]
#[command(name = "tripit-auth", about = "Generate OAuth tokens for the TripIt API")]
struct Args {
    /// TripIt API consumer key
    #[arg(long, env = "TRIPIT_CONSUMER_KEY")]
    consumer_key: String,

    /// TripIt API consumer secret
    #[arg(long, env = "TRIPIT_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: String,

    /// Base URL of the TripIt API
    #[arg(long, env = "TRIPIT_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Request timeout in seconds
    #[arg(long, env = "TRIPIT_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Skip the test call made with the new tokens
    #[arg(long)]
    no_verify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripit_oauth1=info,tripit_auth=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::new(args.consumer_key, args.consumer_secret)
        .api_base(&args.api_base)?
        .timeout(Duration::from_secs(args.timeout_secs));
    let tripit = TripIt::new(config)?;

    println!("TripIt OAuth Token Generator");
    println!("============================");

    let request = tripit
        .obtain_request_token()
        .await
        .context("could not obtain a request token")?;

    println!();
    println!("Open this URL, log in to TripIt and authorize the application:");
    println!();
    println!("    {}", tripit.build_authorize_url(&request.oauth_token));
    println!();
    print!("Press Enter once you have authorized it... ");
    io::stdout().flush()?;
    wait_for_enter().await?;

    let access = tripit
        .exchange_for_access_token(&request.oauth_token, &request.oauth_token_secret)
        .await
        .context("could not exchange the request token")?;

    println!();
    println!("Add these lines to your .env file:");
    println!();
    println!("TRIPIT_OAUTH_TOKEN={}", access.oauth_token);
    println!("TRIPIT_OAUTH_TOKEN_SECRET={}", access.oauth_token_secret);

    if !args.no_verify {
        info!("verifying tokens with a list/trip call");
        let trips = tripit
            .api()
            .verify()
            .await
            .context("tokens were issued but TripIt rejected them")?;
        println!();
        println!("Tokens work, found {} trip(s).", trips);
    }
    Ok(())
}

async fn wait_for_enter() -> Result<()> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| ())
    })
    .await??;
    Ok(())
}
