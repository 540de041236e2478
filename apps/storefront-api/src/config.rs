use axum_helpers::{CorsConfig, JwtConfig};
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse, server::ServerConfig,
};
use database::mongodb::MongoConfig;
use domain_users::SeedAdmin;

pub use core_config::Environment;

/// Application configuration, composed from the shared config pieces.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    /// `ORDERS_PUBLIC_READ`: let anyone list and fetch orders
    pub orders_public_read: bool,
    /// Admin account created at start-up when missing
    pub seed_admin: Option<SeedAdmin>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let cors = CorsConfig::from_env()?;
        let orders_public_read = env_parse("ORDERS_PUBLIC_READ", false)?;
        let seed_admin = seed_admin_from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            jwt,
            cors,
            orders_public_read,
            seed_admin,
        })
    }
}

/// `ADMIN_EMAIL`, `ADMIN_USERNAME` and `ADMIN_PASSWORD` are all-or-nothing;
/// `ADMIN_NAME` defaults to "Administrator".
fn seed_admin_from_env() -> Result<Option<SeedAdmin>, ConfigError> {
    let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    match (var("ADMIN_EMAIL"), var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
        (None, None, None) => Ok(None),
        (Some(email), Some(username), Some(password)) => Ok(Some(SeedAdmin {
            name: env_or_default("ADMIN_NAME", "Administrator"),
            email,
            username,
            password,
        })),
        (email, username, _) => {
            let missing = if email.is_none() {
                "ADMIN_EMAIL"
            } else if username.is_none() {
                "ADMIN_USERNAME"
            } else {
                "ADMIN_PASSWORD"
            };
            Err(ConfigError::MissingEnvVar(missing.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-with-32-characters!!!";

    fn base_vars() -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            ("MONGODB_URL", Some("mongodb://localhost:27017")),
            ("MONGODB_DATABASE", Some("storefront_test")),
            ("JWT_SECRET", Some(SECRET)),
            ("JWT_PREVIOUS_SECRETS", None),
            ("JWT_TTL_SECS", None),
            ("CORS_ALLOWED_ORIGIN", Some("http://localhost:5173")),
            ("ORDERS_PUBLIC_READ", None),
            ("ADMIN_EMAIL", None),
            ("ADMIN_USERNAME", None),
            ("ADMIN_PASSWORD", None),
            ("ADMIN_NAME", None),
        ]
    }

    fn with_overrides(
        overrides: &[(&'static str, Option<&'static str>)],
    ) -> Vec<(&'static str, Option<&'static str>)> {
        let mut vars = base_vars();
        for &(key, value) in overrides {
            vars.retain(|(k, _)| *k != key);
            vars.push((key, value));
        }
        vars
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(base_vars(), || {
            let config = Config::from_env().unwrap();
            assert!(!config.orders_public_read);
            assert!(config.seed_admin.is_none());
            assert_eq!(config.jwt.ttl_secs, 3600);
            assert_eq!(config.cors.allowed_origins.len(), 1);
            assert_eq!(config.app.name, "storefront_api");
        });
    }

    #[test]
    fn test_missing_jwt_secret_fails() {
        temp_env::with_vars(with_overrides(&[("JWT_SECRET", None)]), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_orders_public_read_flag() {
        temp_env::with_vars(with_overrides(&[("ORDERS_PUBLIC_READ", Some("true"))]), || {
            assert!(Config::from_env().unwrap().orders_public_read);
        });
        temp_env::with_vars(with_overrides(&[("ORDERS_PUBLIC_READ", Some("yes"))]), || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_seed_admin_all_or_nothing() {
        temp_env::with_vars(
            with_overrides(&[
                ("ADMIN_EMAIL", Some("root@example.com")),
                ("ADMIN_USERNAME", Some("root")),
                ("ADMIN_PASSWORD", Some("rootpass")),
            ]),
            || {
                let seed = Config::from_env().unwrap().seed_admin.unwrap();
                assert_eq!(seed.name, "Administrator");
                assert_eq!(seed.username, "root");
            },
        );

        temp_env::with_vars(
            with_overrides(&[
                ("ADMIN_EMAIL", Some("root@example.com")),
                ("ADMIN_USERNAME", Some("root")),
            ]),
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("ADMIN_PASSWORD"));
            },
        );
    }
}
