use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;

/// RAG Admin Client - command line interface
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Base URL of the admin backend API
    #[arg(short = 'u', long, env = "API_BASE_URL", default_value = "http://localhost:3000/api")]
    pub base_url: String,

    /// Email to log in with (prompts for the password); omit to only check
    /// the current session
    #[arg(short, long, env = "ADMIN_EMAIL")]
    pub email: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Backend API base URL
    pub api_base_url: String,

    /// Optional login email for the CLI
    pub email: Option<String>,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();

        Ok(Config {
            api_base_url: args.base_url,
            email: args.email,
            http_connect_timeout: args.connect_timeout,
            http_request_timeout: args.request_timeout,
            log_level: args.log_level,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)
            .with_context(|| format!("API_BASE_URL is not a valid URL: {}", self.api_base_url))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("API_BASE_URL must be http or https: {}", self.api_base_url);
        }

        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_url(url: &str) -> Config {
        Config {
            api_base_url: url.to_string(),
            email: None,
            http_connect_timeout: 10,
            http_request_timeout: 30,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_http_url() {
        assert!(config_with_url("http://localhost:3000/api").validate().is_ok());
        assert!(config_with_url("https://rag.example.com/api").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_invalid_url() {
        assert!(config_with_url("not a url").validate().is_err());
        assert!(config_with_url("ftp://example.com").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = config_with_url("http://localhost:3000/api");
        config.http_request_timeout = 0;
        assert!(config.validate().is_err());
    }
}
