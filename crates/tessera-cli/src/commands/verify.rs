use anyhow::Result;
use tessera_auth::prelude::*;

use crate::cli::VerifyArgs;
use crate::config::AppConfig;
use crate::output::{print_json, print_success};

pub fn verify(config: &AppConfig, args: &VerifyArgs) -> Result<()> {
    let signer = Signer::from_config(&config.auth.signing)?;

    // Expiry surfaces as `AuthError::TokenExpired`, anything else as `InvalidToken`.
    let claims = signer
        .verify(args.token.trim(), &SystemClock)
        .map_err(AuthError::from)?;

    print_success(&format!("token valid for {}", claims.sub));
    print_json(&claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.signing.key = Some("verify-secret".to_string());
        config
    }

    fn token(issued_at: OffsetDateTime) -> String {
        let signer = Signer::from_config(&config().auth.signing).unwrap();
        let claims = AccessClaims::new(
            "u1",
            "c1",
            "",
            "a@example.com",
            issued_at,
            time::Duration::hours(1),
        );
        signer.sign(&claims).unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let args = VerifyArgs {
            token: token(OffsetDateTime::now_utc()),
        };
        assert!(verify(&config(), &args).is_ok());
    }

    #[test]
    fn test_verify_expired_token() {
        let args = VerifyArgs {
            token: token(OffsetDateTime::now_utc() - time::Duration::days(1)),
        };
        let err = verify(&config(), &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_verify_tampered_token() {
        let mut token = token(OffsetDateTime::now_utc());
        token.push('x');
        let err = verify(&config(), &VerifyArgs { token }).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::InvalidToken { .. })
        ));
    }
}
