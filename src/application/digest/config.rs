use serde::Deserialize;
use url::Url;

/// `[digest]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DigestConfig {
    /// Market page prefix; the contract id is appended as a path segment.
    #[serde(default = "default_market_base_url")]
    pub market_base_url: String,
}

fn default_market_base_url() -> String {
    "https://polymarket.com/market/".to_string()
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            market_base_url: default_market_base_url(),
        }
    }
}

impl DigestConfig {
    /// Parsed base URL. Validated at config load.
    pub fn market_base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.market_base_url)
    }
}
