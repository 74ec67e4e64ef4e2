use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Tessera CLI: issue and verify access tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to tessera.toml in the working directory)
    #[arg(short, long, global = true, env = "TESSERA_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue an access token (and optionally a refresh token) for a user
    Issue(IssueArgs),
    /// Verify an access token and print its claims
    Verify(VerifyArgs),
    /// Generate a signing key for an algorithm
    Keygen(KeygenArgs),
}

#[derive(clap::Args)]
pub struct IssueArgs {
    /// User ID (must exist in the configured users)
    #[arg(short, long)]
    pub user: String,
    /// Client ID the token is issued to
    #[arg(long)]
    pub client: String,
    /// Requested scope, space or comma delimited
    #[arg(short, long, default_value = "")]
    pub scope: String,
    /// Access token lifetime in seconds, at least 1 (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub lifetime_secs: Option<u64>,
    /// Issue a refresh token (overrides config)
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_refresh")]
    pub refresh: bool,
    /// Do not issue a refresh token (overrides config)
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_refresh: bool,
    /// Seconds to wait for user lookup and scope validation
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

impl IssueArgs {
    /// Resolves the refresh flags against the configured default.
    pub fn with_refresh(&self, default: bool) -> bool {
        if self.refresh {
            true
        } else if self.no_refresh {
            false
        } else {
            default
        }
    }
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// The access token to verify
    pub token: String,
}

#[derive(clap::Args)]
pub struct KeygenArgs {
    /// Signing algorithm (e.g. ES256, RS256, HS512)
    #[arg(short, long, default_value = "ES256")]
    pub algorithm: String,
}
