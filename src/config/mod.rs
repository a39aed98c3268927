use anyhow::anyhow;
use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// YouTube Data API v3 key
    pub youtube_api_key: String,

    /// Generative Language API key
    pub gemini_api_key: String,

    /// Model identifier (e.g. gemini-2.5-flash)
    pub gemini_model: String,

    /// Origin allowed by CORS (the front-end dev server)
    pub allowed_origin: String,

    /// Address the HTTP server listens on
    pub bind_addr: String,
}

impl Config {
    /// Load from environment variables (dotenv recommended)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let youtube_api_key =
            env::var("YOUTUBE_API_KEY").map_err(|_| anyhow!("Missing YOUTUBE_API_KEY"))?;

        let gemini_api_key =
            env::var("GEMINI_API_KEY").map_err(|_| anyhow!("Missing GEMINI_API_KEY"))?;

        let gemini_model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

        let allowed_origin =
            env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

        Ok(Config {
            youtube_api_key,
            gemini_api_key,
            gemini_model,
            allowed_origin,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so the cases run in one test to avoid
    // interleaving with parallel test threads.
    #[test]
    fn test_from_env() {
        env::remove_var("YOUTUBE_API_KEY");
        env::remove_var("GEMINI_API_KEY");
        env::remove_var("GEMINI_MODEL");
        env::remove_var("ALLOWED_ORIGIN");
        env::remove_var("BIND_ADDR");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("Missing YOUTUBE_API_KEY"));

        env::set_var("YOUTUBE_API_KEY", "yt-key");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("Missing GEMINI_API_KEY"));

        env::set_var("GEMINI_API_KEY", "gm-key");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.youtube_api_key, "yt-key");
        assert_eq!(cfg.gemini_model, "gemini-2.5-flash");
        assert_eq!(cfg.allowed_origin, "http://localhost:5173");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");

        env::set_var("GEMINI_MODEL", "gemini-2.5-pro");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.gemini_model, "gemini-2.5-pro");

        env::remove_var("YOUTUBE_API_KEY");
        env::remove_var("GEMINI_API_KEY");
        env::remove_var("GEMINI_MODEL");
    }
}
