use core_config::{ConfigError, FromEnv, env_list, env_parse, env_required};

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_TTL_SECS: i64 = 3600;

/// JWT signing configuration.
///
/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters) signs new tokens
/// - `JWT_PREVIOUS_SECRETS` (optional, comma-separated) still verify
///   tokens signed before a rotation
/// - `JWT_TTL_SECS` (default 3600)
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub previous_secrets: Vec<String>,
    pub ttl_secs: i64,
}

impl JwtConfig {
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            previous_secrets: Vec::new(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    pub fn with_previous_secrets(mut self, secrets: Vec<String>) -> Self {
        self.previous_secrets = secrets;
        self
    }

    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("previous_secrets", &self.previous_secrets.len())
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

fn check_secret(key: &str, secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!(
                "must be at least 32 characters (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret("JWT_SECRET", &secret)?;

        let previous_secrets = env_list("JWT_PREVIOUS_SECRETS");
        for previous in &previous_secrets {
            check_secret("JWT_PREVIOUS_SECRETS", previous)?;
        }

        let ttl_secs = env_parse("JWT_TTL_SECS", DEFAULT_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_TTL_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            secret,
            previous_secrets,
            ttl_secs,
        })
    }
}
