use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    /// Override for the platform API host, mainly for non-production setups.
    pub platform_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8081".to_string());

        let platform_base_url = env::var("QUIP_BASE_URL").ok().filter(|url| !url.is_empty());

        Ok(Self {
            bind_address,
            platform_base_url,
        })
    }

    /// A client for the token the hook caller supplied.
    pub fn client_for_token(&self, access_token: &str) -> quip::QuipClient {
        let mut config = quip::ClientConfig {
            access_token: Some(access_token.to_string()),
            ..Default::default()
        };
        if let Some(base_url) = &self.platform_base_url {
            config.base_url = base_url.clone();
        }
        quip::QuipClient::new(config)
    }
}
