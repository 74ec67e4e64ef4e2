//! Token issuance: claims, signing, refresh tokens and the generator that
//! ties them together.

pub mod claims;
pub mod generator;
pub mod refresh;
pub mod signer;

pub use claims::{AccessClaims, ClaimsUser, check_expiry, validate};
pub use generator::{DEFAULT_ACCESS_TOKEN_LIFETIME, GrantRequest, IssuedTokens, TokenGenerator};
pub use refresh::{
    KeyedRefreshDeriver, REFRESH_TOKEN_LEN, RefreshTokenDeriver, SaltedRefreshDeriver,
    deriver_from_config, is_refresh_token_shaped,
};
pub use signer::{
    EcPrivateKey, HmacSecret, JwtError, Signer, SigningAlgorithm, SigningFamily, SigningKey,
};
