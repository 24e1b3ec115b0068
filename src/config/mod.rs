use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_ENV, find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    payments: Payments,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    database_uri: String,
    #[serde(default)]
    docs: bool,
    /// Account registered with this email is granted the admin role.
    admin_email: String,
    impersonation_secret: String,
    /// Frontend origin used to build checkout redirect URLs.
    public_url: String,
    #[serde(default = "default_uploads_dir")]
    uploads_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct Payments {
    secret_key: String,
    webhook_secret: String,
    #[serde(default = "default_api_base")]
    api_base: String,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default = "default_webhook_tolerance")]
    webhook_tolerance_secs: i64,
}

fn default_uploads_dir() -> String {
    String::from("uploads")
}

fn default_api_base() -> String {
    String::from("https://api.stripe.com")
}

fn default_currency() -> String {
    String::from("usd")
}

fn default_webhook_tolerance() -> i64 {
    300
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    let config: Self = toml::from_slice(&bytes)?;
                    config.validate()?;
                    Ok(config)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Unable to load config.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn from_toml(src: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Secrets must be set, and URLs must be absolute so redirects and API
    /// calls can be built from them.
    fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("app.jwt", self.app.jwt.as_str()),
            ("app.impersonation_secret", self.app.impersonation_secret.as_str()),
            ("payments.webhook_secret", self.payments.webhook_secret.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "must not be empty",
                });
            }
        }

        let urls = [
            ("app.public_url", self.app.public_url.as_str()),
            ("payments.api_base", self.payments.api_base.as_str()),
        ];
        for (key, value) in urls {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "must be an http(s) URL",
                });
            }
        }

        if self.payments.webhook_tolerance_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "payments.webhook_tolerance_secs",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn payments(&self) -> &Payments {
        &self.payments
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    #[inline]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    #[inline]
    pub fn impersonation_secret(&self) -> &str {
        &self.impersonation_secret
    }

    #[inline]
    pub fn public_url(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }

    #[inline]
    pub fn uploads_dir(&self) -> &str {
        &self.uploads_dir
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_email.trim().eq_ignore_ascii_case(email.trim())
    }
}

impl Payments {
    #[inline]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    #[inline]
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    #[inline]
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    #[inline]
    pub fn webhook_tolerance_secs(&self) -> i64 {
        self.webhook_tolerance_secs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
    }

    #[test]
    fn config_defaults_test() {
        let config = Config::from_toml(
            r#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/db"
            admin_email = "Owner@Example.com"
            impersonation_secret = "imp"
            public_url = "https://shop.example.com/"

            [payments]
            secret_key = "sk"
            webhook_secret = "whsec"
            "#,
        )
        .unwrap();

        assert!(!config.app().docs());
        assert_eq!(config.app().uploads_dir(), "uploads");
        assert_eq!(config.app().public_url(), "https://shop.example.com");
        assert!(config.app().is_admin_email(" owner@example.com"));
        assert!(!config.app().is_admin_email("someone@example.com"));
        assert_eq!(config.payments().api_base(), "https://api.stripe.com");
        assert_eq!(config.payments().currency(), "usd");
        assert_eq!(config.payments().webhook_tolerance_secs(), 300);
    }

    #[test]
    fn config_missing_section_test() {
        let result = Config::from_toml("[host]\nbindto = \"127.0.0.1:1\"\n");
        assert!(matches!(result, Err(ConfigError::TomlDeError(_))));
    }

    #[test]
    fn config_rejects_invalid_values_test() {
        let src = |jwt: &str, public_url: &str| {
            format!(
                r#"
                [host]
                bindto = "127.0.0.1:1"

                [app]
                jwt = "{jwt}"
                database_uri = "postgres://localhost/db"
                admin_email = "owner@example.com"
                impersonation_secret = "imp"
                public_url = "{public_url}"

                [payments]
                secret_key = "sk"
                webhook_secret = "whsec"
                "#
            )
        };

        let result = Config::from_toml(&src("  ", "https://shop.example.com"));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "app.jwt", .. })
        ));

        let result = Config::from_toml(&src("secret", "shop.example.com"));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "app.public_url", .. })
        ));

        assert!(Config::from_toml(&src("secret", "http://localhost:3000")).is_ok());
    }
}
