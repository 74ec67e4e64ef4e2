use anyhow::Result;
use tessera_auth::token::{SigningAlgorithm, SigningKey};

use crate::cli::KeygenArgs;

pub fn keygen(args: &KeygenArgs) -> Result<()> {
    let algorithm: SigningAlgorithm = args.algorithm.parse()?;
    let exported = generate_key(algorithm)?;
    println!("{}", exported.trim_end());
    Ok(())
}

fn generate_key(algorithm: SigningAlgorithm) -> Result<String> {
    let key = SigningKey::generate(algorithm)?;
    tracing::debug!(algorithm = %algorithm, family = %key.family(), "generated signing key");
    Ok(key.export()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_auth::token::Signer;

    #[test]
    fn test_generated_keys_load_as_signers() {
        for algorithm in [
            SigningAlgorithm::ES256,
            SigningAlgorithm::ES384,
            SigningAlgorithm::HS256,
            SigningAlgorithm::HS512,
        ] {
            let material = generate_key(algorithm).unwrap();
            assert!(Signer::from_key_material(algorithm, material.as_bytes()).is_ok());
        }
    }

    #[test]
    fn test_unknown_algorithm() {
        let args = KeygenArgs {
            algorithm: "none".to_string(),
        };
        assert!(keygen(&args).is_err());
    }
}
