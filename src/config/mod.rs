use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{self, Validator};

pub const DEFAULT_ISSUER: &str = "filebuddy";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration value {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid signing key material: {0}")]
    KeyMaterial(String),

    // Carries the violated rules, never the value.
    #[error("unusable value for {key}: {reason}")]
    Credential { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub http: HttpConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub port: u16,
    /// Prefix every route is nested under, e.g. `/api`. Empty means no prefix.
    pub global_prefix: String,
    /// Allowed CORS origins. Empty means permissive; production requires a list.
    pub cors_origins: Vec<String>,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub root_username: String,
    pub root_password: String,
    pub jwt: JwtConfig,
}

// Credentials and secrets stay out of logs.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("root_username", &self.root_username)
            .field("root_password", &"<redacted>")
            .field("jwt", &self.jwt)
            .finish()
    }
}

/// Signing parameters for issued tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub algorithm: Algorithm,
    pub secret: Option<String>,
    pub public_key_path: Option<PathBuf>,
    pub private_key_path: Option<PathBuf>,
    pub issuer: String,
    pub audience: String,
    pub access_expires_in: ExpiresIn,
    pub refresh_expires_in: ExpiresIn,
    pub revoke_on_refresh: bool,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("public_key_path", &self.public_key_path)
            .field("private_key_path", &self.private_key_path)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_expires_in", &self.access_expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("revoke_on_refresh", &self.revoke_on_refresh)
            .finish()
    }
}

impl JwtConfig {
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        )
    }
}

/// Token lifetime, written either as a bare number of seconds (`900`) or a
/// duration string (`15m`, `30d`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiresIn(Duration);

impl ExpiresIn {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl FromStr for ExpiresIn {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::Invalid {
            key: "expires_in",
            value: s.to_string(),
        };

        let duration = if s.chars().all(|c| c.is_ascii_digit()) {
            Duration::from_secs(s.parse().map_err(|_| invalid())?)
        } else {
            humantime::parse_duration(s).map_err(|_| invalid())?
        };

        if duration.as_secs() == 0 {
            return Err(invalid());
        }
        Ok(Self(duration))
    }
}

impl fmt::Display for ExpiresIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. `from_env` is
    /// this with the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV") {
            Some(v) => v.parse()?,
            None => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // HTTP overrides
        if let Some(v) = lookup("HTTP_PORT") {
            self.http.port = v.parse().map_err(|_| ConfigError::Invalid {
                key: "HTTP_PORT",
                value: v,
            })?;
        }
        if let Some(v) = lookup("HTTP_GLOBAL_PREFIX") {
            self.http.global_prefix = normalize_prefix(&v);
        }
        if let Some(v) = lookup("HTTP_CORS_ORIGINS") {
            self.http.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Credential overrides
        if let Some(v) = lookup("SECURITY_ROOT_USERNAME") {
            self.security.root_username = v;
        }
        if let Some(v) = lookup("SECURITY_ROOT_PASSWORD") {
            self.security.root_password = v;
        }

        // JWT overrides
        let jwt = &mut self.security.jwt;
        if let Some(v) = lookup("SECURITY_JWT_ALGORITHM") {
            jwt.algorithm = Algorithm::from_str(&v).map_err(|_| ConfigError::Invalid {
                key: "SECURITY_JWT_ALGORITHM",
                value: v,
            })?;
        }
        if let Some(v) = lookup("SECURITY_JWT_SECRET") {
            jwt.secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("SECURITY_JWT_PUBLIC_KEY") {
            jwt.public_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SECURITY_JWT_PRIVATE_KEY") {
            jwt.private_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SECURITY_JWT_ISSUER") {
            jwt.issuer = v;
        }
        if let Some(v) = lookup("SECURITY_JWT_AUDIENCE") {
            jwt.audience = v;
        }
        if let Some(v) = lookup("SECURITY_JWT_ACCESS_EXPIRES_IN") {
            jwt.access_expires_in = v.parse()?;
        }
        if let Some(v) = lookup("SECURITY_JWT_REFRESH_EXPIRES_IN") {
            jwt.refresh_expires_in = v.parse()?;
        }
        if let Some(v) = lookup("SECURITY_JWT_REVOKE_ON_REFRESH") {
            jwt.revoke_on_refresh = v.parse().map_err(|_| ConfigError::Invalid {
                key: "SECURITY_JWT_REVOKE_ON_REFRESH",
                value: v,
            })?;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.root_username.is_empty() {
            return Err(ConfigError::Missing("SECURITY_ROOT_USERNAME"));
        }
        if self.security.root_password.is_empty() {
            return Err(ConfigError::Missing("SECURITY_ROOT_PASSWORD"));
        }
        self.validate_credentials()?;

        if self.environment == Environment::Production && self.http.cors_origins.is_empty() {
            return Err(ConfigError::Missing("HTTP_CORS_ORIGINS"));
        }

        let jwt = &self.security.jwt;
        if jwt.is_symmetric() {
            if jwt.secret.is_none() {
                return Err(ConfigError::Missing("SECURITY_JWT_SECRET"));
            }
        } else if jwt.public_key_path.is_none() {
            return Err(ConfigError::Missing("SECURITY_JWT_PUBLIC_KEY"));
        }
        Ok(())
    }

    /// The configured admin has to pass the same body validation as
    /// `/auth/token`.
    fn validate_credentials(&self) -> Result<(), ConfigError> {
        let mut username = Validator::new();
        validation::check_username(&mut username, &self.security.root_username);
        credential_result("SECURITY_ROOT_USERNAME", username)?;

        let mut password = Validator::new();
        validation::check_password(&mut password, &self.security.root_password);
        credential_result("SECURITY_ROOT_PASSWORD", password)?;

        if !validation::is_strong_password(&self.security.root_password) {
            tracing::warn!("SECURITY_ROOT_PASSWORD is weak; mix cases, digits and one of @$!%*?&");
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            http: HttpConfig {
                port: DEFAULT_HTTP_PORT,
                global_prefix: String::new(),
                cors_origins: Vec::new(),
            },
            security: SecurityConfig::defaults(Environment::Development),
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            http: HttpConfig {
                port: DEFAULT_HTTP_PORT,
                global_prefix: String::new(),
                cors_origins: Vec::new(),
            },
            security: SecurityConfig::defaults(Environment::Test),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            http: HttpConfig {
                port: DEFAULT_HTTP_PORT,
                global_prefix: "/api".to_string(),
                // Must be set through HTTP_CORS_ORIGINS
                cors_origins: Vec::new(),
            },
            security: SecurityConfig::defaults(Environment::Production),
        }
    }
}

impl SecurityConfig {
    fn defaults(environment: Environment) -> Self {
        Self {
            root_username: String::new(),
            root_password: String::new(),
            jwt: JwtConfig {
                algorithm: Algorithm::HS512,
                secret: None,
                public_key_path: None,
                private_key_path: None,
                issuer: DEFAULT_ISSUER.to_string(),
                audience: environment.as_str().to_string(),
                access_expires_in: ExpiresIn::from_secs(15 * 60),
                refresh_expires_in: ExpiresIn::from_secs(30 * 24 * 60 * 60),
                revoke_on_refresh: true,
            },
        }
    }
}

fn credential_result(key: &'static str, validator: Validator) -> Result<(), ConfigError> {
    validator.finish().map_err(|errors| ConfigError::Credential {
        key,
        reason: errors
            .iter()
            .flat_map(|e| e.constraints.values().cloned())
            .collect::<Vec<_>>()
            .join("; "),
    })
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Loads `.{APP_ENV}.env` and then `.env`. Variables already present in the
/// process environment win over both files.
pub fn load_dotenv() {
    let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    let _ = dotenvy::from_filename(format!(".{}.env", environment));
    let _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SECURITY_ROOT_USERNAME", "root"),
            ("SECURITY_ROOT_PASSWORD", "correct-pass"),
            ("SECURITY_JWT_SECRET", "a-very-secret-value"),
        ]
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.security.jwt.algorithm, Algorithm::HS512);
        assert_eq!(config.security.jwt.issuer, "filebuddy");
        assert_eq!(config.security.jwt.audience, "development");
        assert_eq!(config.security.jwt.access_expires_in.as_secs(), 900);
        assert_eq!(config.security.jwt.refresh_expires_in.as_secs(), 2_592_000);
    }

    #[test]
    fn test_audience_follows_environment() {
        let mut pairs = minimal();
        pairs.push(("APP_ENV", "production"));
        pairs.push(("HTTP_CORS_ORIGINS", "https://files.example.org, https://admin.example.org"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.security.jwt.audience, "production");
        assert_eq!(config.http.global_prefix, "/api");
        assert_eq!(
            config.http.cors_origins,
            vec!["https://files.example.org", "https://admin.example.org"]
        );
    }

    #[test]
    fn test_production_requires_cors_origins() {
        let mut pairs = minimal();
        pairs.push(("APP_ENV", "production"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("HTTP_CORS_ORIGINS")));
    }

    #[test]
    fn test_admin_that_cannot_log_in_is_rejected() {
        let mut pairs = minimal();
        pairs.push(("SECURITY_ROOT_USERNAME", "ad-min"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Credential { key: "SECURITY_ROOT_USERNAME", .. }));

        let mut pairs = minimal();
        pairs.push(("SECURITY_ROOT_PASSWORD", "hunter2"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Credential { key: "SECURITY_ROOT_PASSWORD", .. }));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn test_env_overrides() {
        let mut pairs = minimal();
        pairs.extend([
            ("HTTP_PORT", "9000"),
            ("HTTP_GLOBAL_PREFIX", "v1/"),
            ("SECURITY_JWT_ISSUER", "custom"),
            ("SECURITY_JWT_ACCESS_EXPIRES_IN", "60"),
            ("SECURITY_JWT_REFRESH_EXPIRES_IN", "2h"),
            ("SECURITY_JWT_REVOKE_ON_REFRESH", "false"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.global_prefix, "/v1");
        assert_eq!(config.security.jwt.issuer, "custom");
        assert_eq!(config.security.jwt.access_expires_in.as_secs(), 60);
        assert_eq!(config.security.jwt.refresh_expires_in.as_secs(), 7200);
        assert!(!config.security.jwt.revoke_on_refresh);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("SECURITY_JWT_SECRET", "s")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECURITY_ROOT_USERNAME")));
    }

    #[test]
    fn test_asymmetric_algorithm_requires_public_key() {
        let pairs = [
            ("SECURITY_ROOT_USERNAME", "root"),
            ("SECURITY_ROOT_PASSWORD", "correct-pass"),
            ("SECURITY_JWT_ALGORITHM", "RS256"),
        ];
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECURITY_JWT_PUBLIC_KEY")));
    }

    #[test]
    fn test_expires_in_parsing() {
        assert_eq!("15m".parse::<ExpiresIn>().unwrap().as_secs(), 900);
        assert_eq!("30d".parse::<ExpiresIn>().unwrap().as_secs(), 2_592_000);
        assert_eq!("3600".parse::<ExpiresIn>().unwrap().as_secs(), 3600);
        assert!("soon".parse::<ExpiresIn>().is_err());
        assert!("0".parse::<ExpiresIn>().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("correct-pass"));
        assert!(!rendered.contains("a-very-secret-value"));
    }
}
