use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    /// Override for the platform API host, mainly for non-production setups.
    pub platform_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let platform_base_url = env::var("QUIP_BASE_URL").ok().filter(|url| !url.is_empty());

        Ok(Self {
            bind_address,
            platform_base_url,
        })
    }

    /// A client for the token extracted from an inbound address. Mail
    /// handling tolerates slow attachments, hence the longer timeout.
    pub fn client_for_token(&self, access_token: &str) -> quip::QuipClient {
        let mut config = quip::ClientConfig {
            access_token: Some(access_token.to_string()),
            request_timeout: Duration::from_secs(30),
            ..Default::default()
        };
        if let Some(base_url) = &self.platform_base_url {
            config.base_url = base_url.clone();
        }
        quip::QuipClient::new(config)
    }
}
