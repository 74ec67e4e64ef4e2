//! JWT signing and verification.
//!
//! A [`Signer`] owns one signing key and one algorithm for the lifetime of the
//! process. The algorithm catalog is split into four families, and each
//! family expects a different shape of key material:
//!
//! - **HMAC** (`HS256`, `HS384`, `HS512`): the raw shared secret.
//! - **RSA** (`RS256`, `RS384`, `RS512`): a PEM-encoded RSA private key
//!   (PKCS#1 or PKCS#8).
//! - **RSA-PSS** (`PS256`, `PS384`, `PS512`): same key shape as RSA.
//! - **Elliptic curve** (`ES256`, `ES384`): a PEM-encoded private key on the
//!   curve the algorithm names (P-256 or P-384), PKCS#8 or SEC1.
//!
//! Key material is parsed into a [`SigningKey`] when the signer is built, so
//! a key that does not fit its algorithm is reported at startup rather than
//! on the first token.
//!
//! ## Example
//!
//! ```ignore
//! use tessera_auth::token::{Signer, SigningAlgorithm};
//!
//! let signer = Signer::from_key_material(SigningAlgorithm::HS256, b"server-secret")?;
//! let token = signer.sign(&claims)?;
//! let verified = signer.verify(&token, &SystemClock)?;
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;

use crate::AuthResult;
use crate::clock::Clock;
use crate::config::SigningConfig;
use crate::error::AuthError;
use crate::token::claims::{self, AccessClaims};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The algorithm is not in the supported catalog.
    #[error("Unsupported signing method: {algorithm}")]
    UnsupportedMethod {
        /// The algorithm name as configured.
        algorithm: String,
    },

    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGenerationError {
        /// Description of the key generation error.
        message: String,
    },

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `UnsupportedMethod` error.
    #[must_use]
    pub fn unsupported_method(algorithm: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            algorithm: algorithm.into(),
        }
    }

    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `KeyGenerationError`.
    #[must_use]
    pub fn key_generation_error(message: impl Into<String>) -> Self {
        Self::KeyGenerationError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation error (expired, invalid signature, etc.).
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Expired
                | Self::InvalidSignature
                | Self::InvalidClaims { .. }
                | Self::DecodingError { .. }
        )
    }

    /// Returns `true` if this is a key or algorithm configuration error.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMethod { .. } | Self::KeyGenerationError { .. } | Self::InvalidKey { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::decoding_error(err.to_string()),
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidKeyFormat => Self::invalid_key(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Signing Algorithm
// ============================================================================

/// The four families a signing algorithm can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningFamily {
    /// ECDSA (`ES*`).
    EllipticCurve,
    /// RSASSA-PKCS1-v1_5 (`RS*`).
    Rsa,
    /// RSASSA-PSS (`PS*`).
    RsaPss,
    /// HMAC with a shared secret (`HS*`).
    Hmac,
}

impl SigningFamily {
    /// Returns `true` if the family signs with a private key.
    #[must_use]
    pub fn is_asymmetric(&self) -> bool {
        !matches!(self, Self::Hmac)
    }
}

impl fmt::Display for SigningFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EllipticCurve => write!(f, "elliptic-curve"),
            Self::Rsa => write!(f, "rsa"),
            Self::RsaPss => write!(f, "rsa-pss"),
            Self::Hmac => write!(f, "hmac"),
        }
    }
}

/// Supported signing algorithms for JWT tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
    /// RSA PKCS#1 v1.5 with SHA-256.
    RS256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    RS384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    RS512,
    /// RSA-PSS with SHA-256.
    PS256,
    /// RSA-PSS with SHA-384.
    PS384,
    /// RSA-PSS with SHA-512.
    PS512,
    /// ECDSA with P-256 and SHA-256.
    ES256,
    /// ECDSA with P-384 and SHA-384.
    ES384,
}

impl SigningAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 11] = [
        Self::HS256,
        Self::HS384,
        Self::HS512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::PS256,
        Self::PS384,
        Self::PS512,
        Self::ES256,
        Self::ES384,
    ];

    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::PS256 => Algorithm::PS256,
            Self::PS384 => Algorithm::PS384,
            Self::PS512 => Algorithm::PS512,
            Self::ES256 => Algorithm::ES256,
            Self::ES384 => Algorithm::ES384,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
        }
    }

    /// Returns the family this algorithm belongs to.
    #[must_use]
    pub fn family(&self) -> SigningFamily {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => SigningFamily::Hmac,
            Self::RS256 | Self::RS384 | Self::RS512 => SigningFamily::Rsa,
            Self::PS256 | Self::PS384 | Self::PS512 => SigningFamily::RsaPss,
            Self::ES256 | Self::ES384 => SigningFamily::EllipticCurve,
        }
    }

    /// Returns `true` if this is an RSA-based algorithm (PKCS#1 v1.5 or PSS).
    #[must_use]
    pub fn is_rsa(&self) -> bool {
        matches!(self.family(), SigningFamily::Rsa | SigningFamily::RsaPss)
    }

    /// Returns `true` if this is an EC-based algorithm.
    #[must_use]
    pub fn is_ec(&self) -> bool {
        self.family() == SigningFamily::EllipticCurve
    }

    /// Returns `true` if this is an HMAC algorithm.
    #[must_use]
    pub fn is_hmac(&self) -> bool {
        self.family() == SigningFamily::Hmac
    }

    /// Size of a generated HMAC secret, matching the digest length.
    fn hmac_secret_len(self) -> usize {
        match self {
            Self::HS384 => 48,
            Self::HS512 => 64,
            _ => 32,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwtError::unsupported_method(s))
    }
}

// ============================================================================
// Signing Key
// ============================================================================

/// An elliptic-curve private key on one of the supported curves.
#[derive(Clone)]
pub enum EcPrivateKey {
    /// NIST P-256 (for ES256).
    P256(p256::SecretKey),
    /// NIST P-384 (for ES384).
    P384(p384::SecretKey),
}

impl EcPrivateKey {
    /// Returns the JOSE curve name.
    #[must_use]
    pub fn curve(&self) -> &'static str {
        match self {
            Self::P256(_) => "P-256",
            Self::P384(_) => "P-384",
        }
    }

    fn from_pem(algorithm: SigningAlgorithm, pem: &str) -> Result<Self, JwtError> {
        match algorithm {
            SigningAlgorithm::ES256 => p256::SecretKey::from_pkcs8_pem(pem)
                .or_else(|_| p256::SecretKey::from_sec1_pem(pem))
                .map(Self::P256)
                .map_err(|e| JwtError::invalid_key(format!("not a P-256 private key: {e}"))),
            SigningAlgorithm::ES384 => p384::SecretKey::from_pkcs8_pem(pem)
                .or_else(|_| p384::SecretKey::from_sec1_pem(pem))
                .map(Self::P384)
                .map_err(|e| JwtError::invalid_key(format!("not a P-384 private key: {e}"))),
            other => Err(JwtError::invalid_key(format!(
                "Algorithm {other} is not EC-based"
            ))),
        }
    }

    fn to_pkcs8_pem(&self) -> Result<String, JwtError> {
        let pem = match self {
            Self::P256(key) => key.to_pkcs8_pem(LineEnding::LF),
            Self::P384(key) => key.to_pkcs8_pem(LineEnding::LF),
        };
        pem.map(|pem| pem.to_string())
            .map_err(|e| JwtError::invalid_key(e.to_string()))
    }

    /// Public point coordinates (x, y), big-endian.
    fn public_coordinates(&self) -> Result<(Vec<u8>, Vec<u8>), JwtError> {
        let (x, y) = match self {
            Self::P256(key) => {
                let signing_key = p256::ecdsa::SigningKey::from(key);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (point.x().map(|x| x.to_vec()), point.y().map(|y| y.to_vec()))
            }
            Self::P384(key) => {
                let signing_key = p384::ecdsa::SigningKey::from(key);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (point.x().map(|x| x.to_vec()), point.y().map(|y| y.to_vec()))
            }
        };
        let x = x.ok_or_else(|| JwtError::invalid_key("Missing x coordinate"))?;
        let y = y.ok_or_else(|| JwtError::invalid_key("Missing y coordinate"))?;
        Ok((x, y))
    }
}

/// A shared HMAC secret.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacSecret(Vec<u8>);

impl HmacSecret {
    /// Wraps `secret`.
    ///
    /// # Errors
    /// Returns an error if the secret is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, JwtError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(JwtError::invalid_key("HMAC secret must not be empty"));
        }
        Ok(Self(secret))
    }

    /// Returns the secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Parsed key material, one variant per algorithm family.
#[derive(Clone)]
pub enum SigningKey {
    /// Private key for `ES*`.
    EllipticCurve(EcPrivateKey),
    /// Private key for `RS*`.
    Rsa(RsaPrivateKey),
    /// Private key for `PS*`.
    RsaPss(RsaPrivateKey),
    /// Shared secret for `HS*`.
    Hmac(HmacSecret),
}

impl SigningKey {
    /// Interprets `material` as the key shape `algorithm` requires.
    ///
    /// HMAC algorithms take the bytes as the secret itself; every other family
    /// expects PEM text.
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidKey`] if the material cannot be parsed.
    pub fn parse(algorithm: SigningAlgorithm, material: &[u8]) -> Result<Self, JwtError> {
        match algorithm.family() {
            SigningFamily::Hmac => HmacSecret::new(material).map(Self::Hmac),
            SigningFamily::EllipticCurve => {
                EcPrivateKey::from_pem(algorithm, pem_text(material)?).map(Self::EllipticCurve)
            }
            SigningFamily::Rsa => parse_rsa_pem(pem_text(material)?).map(Self::Rsa),
            SigningFamily::RsaPss => parse_rsa_pem(pem_text(material)?).map(Self::RsaPss),
        }
    }

    /// Generates a fresh key suitable for `algorithm`.
    ///
    /// RSA keys are 2048 bits; HMAC secrets are as long as the digest and
    /// base64url-encoded so they survive being pasted into a config file.
    ///
    /// # Errors
    /// Returns an error if key generation fails.
    pub fn generate(algorithm: SigningAlgorithm) -> Result<Self, JwtError> {
        match algorithm {
            SigningAlgorithm::ES256 => Ok(Self::EllipticCurve(EcPrivateKey::P256(
                p256::SecretKey::random(&mut OsRng),
            ))),
            SigningAlgorithm::ES384 => Ok(Self::EllipticCurve(EcPrivateKey::P384(
                p384::SecretKey::random(&mut OsRng),
            ))),
            alg if alg.is_rsa() => {
                let key = RsaPrivateKey::new(&mut OsRng, 2048)
                    .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
                Ok(if alg.family() == SigningFamily::RsaPss {
                    Self::RsaPss(key)
                } else {
                    Self::Rsa(key)
                })
            }
            alg => {
                let mut bytes = vec![0u8; alg.hmac_secret_len()];
                OsRng.fill_bytes(&mut bytes);
                HmacSecret::new(URL_SAFE_NO_PAD.encode(bytes)).map(Self::Hmac)
            }
        }
    }

    /// Returns the family this key can sign for.
    #[must_use]
    pub fn family(&self) -> SigningFamily {
        match self {
            Self::EllipticCurve(_) => SigningFamily::EllipticCurve,
            Self::Rsa(_) => SigningFamily::Rsa,
            Self::RsaPss(_) => SigningFamily::RsaPss,
            Self::Hmac(_) => SigningFamily::Hmac,
        }
    }

    /// Exports the key in the form [`SigningKey::parse`] accepts: PKCS#8 PEM
    /// for asymmetric keys, the secret text for HMAC.
    ///
    /// # Errors
    /// Returns an error if the key cannot be serialized, or if an HMAC
    /// secret is not valid UTF-8.
    pub fn export(&self) -> Result<String, JwtError> {
        match self {
            Self::EllipticCurve(key) => key.to_pkcs8_pem(),
            Self::Rsa(key) | Self::RsaPss(key) => key
                .to_pkcs8_pem(LineEnding::LF)
                .map(|pem| pem.to_string())
                .map_err(|e| JwtError::invalid_key(e.to_string())),
            Self::Hmac(secret) => String::from_utf8(secret.as_bytes().to_vec())
                .map_err(|_| JwtError::invalid_key("HMAC secret is not valid UTF-8")),
        }
    }

    fn encoding_key(&self) -> Result<EncodingKey, JwtError> {
        match self {
            Self::EllipticCurve(key) => EncodingKey::from_ec_pem(key.to_pkcs8_pem()?.as_bytes())
                .map_err(|e| JwtError::invalid_key(e.to_string())),
            Self::Rsa(key) | Self::RsaPss(key) => {
                let pem = key
                    .to_pkcs8_pem(LineEnding::LF)
                    .map_err(|e| JwtError::invalid_key(e.to_string()))?;
                EncodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| JwtError::invalid_key(e.to_string()))
            }
            Self::Hmac(secret) => Ok(EncodingKey::from_secret(secret.as_bytes())),
        }
    }

    fn decoding_key(&self) -> Result<DecodingKey, JwtError> {
        match self {
            Self::EllipticCurve(key) => {
                let (x, y) = key.public_coordinates()?;
                DecodingKey::from_ec_components(
                    &URL_SAFE_NO_PAD.encode(x),
                    &URL_SAFE_NO_PAD.encode(y),
                )
                .map_err(|e| JwtError::invalid_key(e.to_string()))
            }
            Self::Rsa(key) | Self::RsaPss(key) => {
                let n = URL_SAFE_NO_PAD.encode(key.n().to_bytes_be());
                let e = URL_SAFE_NO_PAD.encode(key.e().to_bytes_be());
                DecodingKey::from_rsa_components(&n, &e)
                    .map_err(|e| JwtError::invalid_key(e.to_string()))
            }
            Self::Hmac(secret) => Ok(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EllipticCurve(key) => write!(f, "SigningKey::EllipticCurve({})", key.curve()),
            Self::Rsa(key) => write!(f, "SigningKey::Rsa({} bits)", key.size() * 8),
            Self::RsaPss(key) => write!(f, "SigningKey::RsaPss({} bits)", key.size() * 8),
            Self::Hmac(_) => write!(f, "SigningKey::Hmac(<redacted>)"),
        }
    }
}

fn pem_text(material: &[u8]) -> Result<&str, JwtError> {
    std::str::from_utf8(material).map_err(|_| JwtError::invalid_key("PEM key is not valid UTF-8"))
}

fn parse_rsa_pem(pem: &str) -> Result<RsaPrivateKey, JwtError> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| JwtError::invalid_key(format!("not an RSA private key: {e}")))
}

// ============================================================================
// Signer
// ============================================================================

/// Signs and verifies access tokens with one key and one algorithm.
///
/// Immutable once built and safe to share across tasks behind an `Arc`.
/// Rotating keys means building a new `Signer` and swapping it in whole.
pub struct Signer {
    algorithm: SigningAlgorithm,
    key: SigningKey,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Signer {
    /// Creates a signer from an already parsed key.
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidKey`] if the key belongs to a different
    /// family than `algorithm`, or is an EC key on the wrong curve.
    pub fn new(algorithm: SigningAlgorithm, key: SigningKey) -> Result<Self, JwtError> {
        if key.family() != algorithm.family() {
            return Err(JwtError::invalid_key(format!(
                "{} key cannot sign {algorithm}",
                key.family()
            )));
        }
        if let SigningKey::EllipticCurve(ec) = &key {
            let expected = if algorithm == SigningAlgorithm::ES256 {
                "P-256"
            } else {
                "P-384"
            };
            if ec.curve() != expected {
                return Err(JwtError::invalid_key(format!(
                    "{algorithm} requires a {expected} key, got {}",
                    ec.curve()
                )));
            }
        }

        let encoding_key = key.encoding_key()?;
        let decoding_key = key.decoding_key()?;

        tracing::debug!(algorithm = %algorithm, family = %algorithm.family(), "signer initialized");

        Ok(Self {
            algorithm,
            key,
            key_id: None,
            encoding_key,
            decoding_key,
        })
    }

    /// Parses `material` for `algorithm` and creates a signer.
    ///
    /// # Errors
    /// Returns an error if the material does not fit the algorithm.
    pub fn from_key_material(
        algorithm: SigningAlgorithm,
        material: &[u8],
    ) -> Result<Self, JwtError> {
        Self::new(algorithm, SigningKey::parse(algorithm, material)?)
    }

    /// Creates a signer from the signing section of the configuration.
    ///
    /// # Errors
    /// Returns an error if the algorithm is unsupported, the key cannot be
    /// read, or the key does not fit the algorithm.
    pub fn from_config(config: &SigningConfig) -> AuthResult<Self> {
        let algorithm = config.algorithm.parse::<SigningAlgorithm>()?;
        let material = config
            .key_material()
            .map_err(|e| AuthError::configuration(e.to_string()))?;
        let signer = Self::from_key_material(algorithm, &material)?;

        Ok(match &config.key_id {
            Some(kid) => signer.with_key_id(kid.clone()),
            None => signer,
        })
    }

    /// Sets the key ID placed in the `kid` header of issued tokens.
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.key_id = Some(kid.into());
        self
    }

    /// Returns the signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the algorithm family.
    #[must_use]
    pub fn family(&self) -> SigningFamily {
        self.key.family()
    }

    /// Returns the configured key ID, if any.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Encodes claims into a compact JWS string.
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidClaims`] if the subject is empty, or an
    /// encoding error if encoding fails.
    pub fn sign(&self, claims: &AccessClaims) -> Result<String, JwtError> {
        if claims.sub.is_empty() {
            return Err(JwtError::invalid_claims("subject must not be empty"));
        }

        let mut header = Header::new(self.algorithm.to_jwt_algorithm());
        header.kid = self.key_id.clone();

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes a token, checks its signature, and checks expiry against `clock`.
    ///
    /// # Errors
    /// Returns [`JwtError::Expired`] for a correctly signed but expired token,
    /// and a decoding, signature or claims error for anything else.
    pub fn verify(&self, token: &str, clock: &dyn Clock) -> Result<AccessClaims, JwtError> {
        let claims = self.decode_allow_expired(token)?;
        claims::validate(&claims, clock)?;
        Ok(claims)
    }

    /// Decodes a token and checks its signature without checking expiry.
    ///
    /// # Errors
    /// Returns an error if decoding or signature verification fails.
    pub fn decode_allow_expired(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm.to_jwt_algorithm());
        // Expiry is checked by `claims::validate` with an injected clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = ["exp", "sub", "aud"]
            .into_iter()
            .map(String::from)
            .collect();

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;
        if data.claims.sub.is_empty() {
            return Err(JwtError::invalid_claims("subject must not be empty"));
        }
        Ok(data.claims)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &self.algorithm)
            .field("key", &self.key)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
