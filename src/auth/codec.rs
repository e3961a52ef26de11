use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, Authority, TokenPayload};
use crate::config::{ConfigError, ExpiresIn, JwtConfig};

/// Per-token parameters passed to [`TokenCodec::issue`].
#[derive(Debug, Clone)]
pub struct SignOptions {
    pub expires_in: ExpiresIn,
    pub subject: String,
    pub token_id: String,
}

/// Signs and verifies bearer tokens.
///
/// Built from either a shared secret (HS*) or a PEM key pair (RS*, PS*, ES*,
/// EdDSA). A codec without a private key can still verify; `issue` then
/// fails with [`AuthError::Signing`].
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl TokenCodec {
    pub fn from_config(config: &JwtConfig) -> Result<Self, ConfigError> {
        let (encoding_key, decoding_key) = if config.is_symmetric() {
            let secret = config
                .secret
                .as_deref()
                .ok_or(ConfigError::Missing("SECURITY_JWT_SECRET"))?;
            tracing::info!(algorithm = ?config.algorithm, "Initializing token codec with shared secret");
            (
                Some(EncodingKey::from_secret(secret.as_bytes())),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        } else {
            let public_path = config
                .public_key_path
                .as_deref()
                .ok_or(ConfigError::Missing("SECURITY_JWT_PUBLIC_KEY"))?;
            let public_pem = read_key_file(public_path)?;
            let decoding_key = decoding_key_from_pem(config.algorithm, &public_pem)?;

            let encoding_key = match config.private_key_path.as_deref() {
                Some(private_path) => {
                    let private_pem = read_key_file(private_path)?;
                    Some(encoding_key_from_pem(config.algorithm, &private_pem)?)
                }
                None => {
                    tracing::warn!("No private key configured, token codec is verify-only");
                    None
                }
            };
            tracing::info!(algorithm = ?config.algorithm, "Initializing token codec with key pair");
            (encoding_key, decoding_key)
        };

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Ok(Self {
            algorithm: config.algorithm,
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    /// Signs a token carrying `authorities` for `options.subject`.
    pub fn issue(
        &self,
        authorities: &BTreeSet<Authority>,
        options: &SignOptions,
    ) -> Result<String, AuthError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AuthError::Signing("no private key configured".to_string()))?;

        let iat = Utc::now().timestamp();
        let lifetime = i64::try_from(options.expires_in.as_secs())
            .map_err(|_| AuthError::Signing("token lifetime out of range".to_string()))?;
        let exp = iat
            .checked_add(lifetime)
            .ok_or_else(|| AuthError::Signing("token lifetime out of range".to_string()))?;

        let payload = TokenPayload {
            sub: options.subject.clone(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            jti: options.token_id.clone(),
            iat,
            exp,
            authorities: authorities.clone(),
        };

        encode(&Header::new(self.algorithm), &payload, encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Recovers the payload of a token issued by a codec with the same key,
    /// issuer and audience. Every failure maps to [`AuthError::Unauthorized`].
    pub fn verify(&self, token: &str) -> Result<TokenPayload, AuthError> {
        let data = decode::<TokenPayload>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::Unauthorized
        })?;

        // jsonwebtoken accepts exp == now; a token is already dead at its expiry second.
        if data.claims.exp <= Utc::now().timestamp() {
            tracing::debug!("Token verification failed: expired");
            return Err(AuthError::Unauthorized);
        }

        Ok(data.claims)
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}

fn encoding_key_from_pem(algorithm: Algorithm, pem: &[u8]) -> Result<EncodingKey, ConfigError> {
    let key = match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => EncodingKey::from_rsa_pem(pem),
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(pem),
        Algorithm::EdDSA => EncodingKey::from_ed_pem(pem),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Err(ConfigError::KeyMaterial(
                "HMAC algorithms use SECURITY_JWT_SECRET, not key files".to_string(),
            ))
        }
    };
    key.map_err(|e| ConfigError::KeyMaterial(format!("private key: {}", e)))
}

fn decoding_key_from_pem(algorithm: Algorithm, pem: &[u8]) -> Result<DecodingKey, ConfigError> {
    let key = match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Err(ConfigError::KeyMaterial(
                "HMAC algorithms use SECURITY_JWT_SECRET, not key files".to_string(),
            ))
        }
    };
    key.map_err(|e| ConfigError::KeyMaterial(format!("public key: {}", e)))
}
