use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CoterieConfig {
    pub hostname: String,
    pub port: u16,
    pub public_url: String,
    /// Display name used in email subjects, e.g. "Coterie".
    pub site_name: String,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    /// SMTP settings; when absent no emails are sent.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    /// Optional TLS configuration for automatic Let's Encrypt certificates.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Domains to obtain certificates for, e.g. ["coterie.example.com"]
    pub domains: Vec<String>,
    /// ACME contact email, e.g. "admin@example.com"
    pub contact_email: String,
    /// Directory to cache certificates (default: "data/certs")
    #[serde(default = "default_cert_cache")]
    pub cert_cache: String,
    /// Use Let's Encrypt production directory (default: false = staging)
    #[serde(default)]
    pub production: bool,
}

fn default_cert_cache() -> String {
    "data/certs".to_string()
}

impl CoterieConfig {
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("COTERIE_").split("__"))
            .extract()
    }
}
