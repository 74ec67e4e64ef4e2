use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tessera_auth::prelude::*;

use crate::cli::IssueArgs;
use crate::config::{AppConfig, SeedUser};
use crate::output::print_json;

/// OAuth2-style token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
}

pub async fn issue(config: &AppConfig, args: &IssueArgs) -> Result<()> {
    config.auth.validate()?;

    let users = seed_users(&config.users).await?;
    let generator = TokenGenerator::from_config(&config.auth, users)?;

    let lifetime = match args.lifetime_secs {
        Some(secs) => Duration::from_secs(secs),
        None => config.auth.token.access_token_lifetime,
    };
    let grant = GrantRequest::new(&args.user, &args.client)
        .with_scope(&args.scope)
        .with_lifetime(time::Duration::try_from(lifetime).context("lifetime out of range")?);
    let with_refresh = args.with_refresh(config.auth.token.issue_refresh_tokens);
    let ctx = IssueContext::with_timeout(Duration::from_secs(args.timeout_secs));

    let tokens = generator.generate(&ctx, &grant, with_refresh).await?;
    let response = token_response(&generator, tokens)?;
    print_json(&response)
}

/// Builds the in-memory user store from seed users.
pub async fn seed_users(seed: &[SeedUser]) -> Result<Arc<InMemoryUserStorage>> {
    let store = InMemoryUserStorage::new();
    for user in seed {
        match &user.id {
            Some(id) => store.upsert(User::with_id(id, &user.email)).await?,
            None => {
                let invited = store.invite(&user.email).await?;
                tracing::info!(user_id = %invited.id, email = %invited.email, "seeded user without ID");
            }
        }
    }
    Ok(Arc::new(store))
}

fn token_response(generator: &TokenGenerator, tokens: IssuedTokens) -> Result<TokenResponse> {
    // The granted scope may be narrower than the requested one.
    let claims = generator.signer().decode_allow_expired(&tokens.access_token)?;
    let expires_in = claims.exp - claims.iat;
    let refresh_token = tokens.has_refresh().then(|| tokens.refresh_token.clone());

    Ok(TokenResponse {
        access_token: tokens.access_token,
        token_type: "Bearer",
        expires_in,
        refresh_token,
        scope: claims.scope,
    })
}
