use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;

use crate::auth::{RevocationList, TokenCodec, TokenService};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a token pair for the configured admin user")]
    Issue,

    #[command(about = "Verify a token and print its payload")]
    Inspect {
        #[arg(help = "Token to verify")]
        token: String,
    },
}

pub fn handle(
    cmd: TokenCommands,
    config: AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let codec = TokenCodec::from_config(&config.security.jwt)
        .context("invalid signing configuration")?;
    let codec = Arc::new(codec);

    match cmd {
        TokenCommands::Issue => {
            let security = &config.security;
            let service = TokenService::new(security, codec, Arc::new(RevocationList::new()));
            let pair = service.authenticate(&security.root_username, &security.root_password)?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pair)?),
                OutputFormat::Text => {
                    println!("access_token:  {}", pair.access_token);
                    println!("refresh_token: {}", pair.refresh_token);
                }
            }
            Ok(())
        }
        TokenCommands::Inspect { token } => {
            let payload = codec.verify(&token)?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&payload)?),
                OutputFormat::Text => {
                    let authorities: Vec<&str> = payload.authorities.iter().map(|a| a.as_str()).collect();
                    println!("subject:     {}", payload.sub);
                    println!("token id:    {}", payload.jti);
                    println!("issuer:      {}", payload.iss);
                    println!("audience:    {}", payload.aud);
                    println!("authorities: {}", authorities.join(", "));
                    let expires = chrono::DateTime::from_timestamp(payload.exp, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| payload.exp.to_string());
                    println!("expires:     {}", expires);
                }
            }
            Ok(())
        }
    }
}
