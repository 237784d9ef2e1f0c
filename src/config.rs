//! Configuration types for the scoring pipelines and the web front-end.
//!
//! All pipeline behaviour is controlled through [`ScorerConfig`], built via
//! its [`ScorerConfigBuilder`]. The form server adds a small
//! [`ServerConfig`]. Both are constructed once at startup and passed into the
//! pipeline explicitly; nothing reads the environment after that, except the
//! provider factory which looks up the credential checked by
//! [`require_credential`].

use crate::error::AtsError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default location of the scholarship leaderboard.
pub const DEFAULT_LEADERBOARD_PATH: &str = "candidatures.csv";

/// Configuration for the résumé and scholarship pipelines.
///
/// # Example
/// ```rust
/// use ats_scorer::ScorerConfig;
///
/// let config = ScorerConfig::builder()
///     .dpi(150)
///     .model("gemini-2.0-flash")
///     .request_delay_ms(1000)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ScorerConfig {
    /// Rendering DPI for the first page of the uploaded CV. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// LLM model identifier. If None, [`DEFAULT_MODEL`] is used.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic", "ollama").
    /// If None, [`DEFAULT_PROVIDER`] is used.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.4.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    pub max_tokens: usize,

    /// Fixed pause before every model call, in milliseconds. Default: 0.
    pub request_delay_ms: u64,

    /// Explicit pdfium library path. Falls back to `./` and the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// CSV file backing the scholarship leaderboard.
    pub leaderboard_path: PathBuf,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 2000,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.4,
            max_tokens: 4096,
            request_delay_ms: 0,
            pdfium_lib_path: None,
            leaderboard_path: PathBuf::from(DEFAULT_LEADERBOARD_PATH),
        }
    }
}

impl fmt::Debug for ScorerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScorerConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("leaderboard_path", &self.leaderboard_path)
            .finish()
    }
}

impl ScorerConfig {
    /// Create a new builder for `ScorerConfig`.
    pub fn builder() -> ScorerConfigBuilder {
        ScorerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Provider name after defaults are applied.
    pub fn effective_provider(&self) -> &str {
        self.provider_name.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Model name after defaults are applied.
    pub fn effective_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`ScorerConfig`].
#[derive(Debug)]
pub struct ScorerConfigBuilder {
    config: ScorerConfig,
}

impl ScorerConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn leaderboard_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.leaderboard_path = path.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScorerConfig, AtsError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(AtsError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(AtsError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.leaderboard_path.as_os_str().is_empty() {
            return Err(AtsError::InvalidConfig(
                "leaderboard path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// HTTP front-end settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted form body (the CV upload dominates). Default: 10 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AtsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AtsError::InvalidConfig(format!("invalid bind address: {e}")))
    }
}

/// Environment variables that may hold the credential for `provider`.
///
/// These are the names the provider factory reads. Providers that run
/// locally need none.
pub fn credential_vars(provider: &str) -> &'static [&'static str] {
    match provider {
        "gemini" => &["GEMINI_API_KEY"],
        "openai" => &["OPENAI_API_KEY"],
        "anthropic" => &["ANTHROPIC_API_KEY"],
        "azure" => &["AZURE_OPENAI_API_KEY"],
        "mistral" => &["MISTRAL_API_KEY"],
        "openrouter" => &["OPENROUTER_API_KEY"],
        _ => &[],
    }
}

/// Check at startup that the credential for `provider` is present.
///
/// Reads the process environment, so a `.env` file must already be loaded.
/// Returns the name of the variable that holds the credential, or `None`
/// for providers that need no key.
pub fn require_credential(provider: &str) -> Result<Option<&'static str>, AtsError> {
    require_credential_with(provider, |key| std::env::var(key).ok())
}

/// [`require_credential`] against an arbitrary variable lookup.
pub fn require_credential_with(
    provider: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<&'static str>, AtsError> {
    let vars = credential_vars(provider);
    if vars.is_empty() {
        return Ok(None);
    }
    vars.iter()
        .copied()
        .find(|var| lookup(var).is_some_and(|v| !v.trim().is_empty()))
        .map(Some)
        .ok_or_else(|| AtsError::MissingCredential {
            var: vars.join(" or "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_dpi() {
        let config = ScorerConfig::builder().dpi(1000).build().unwrap();
        assert_eq!(config.dpi, 400);
        let config = ScorerConfig::builder().dpi(10).build().unwrap();
        assert_eq!(config.dpi, 72);
    }

    #[test]
    fn builder_rejects_zero_max_tokens() {
        let result = ScorerConfig::builder().max_tokens(0).build();
        assert!(matches!(result, Err(AtsError::InvalidConfig(_))));
    }

    #[test]
    fn defaults_apply_to_provider_and_model() {
        let config = ScorerConfig::default();
        assert_eq!(config.effective_provider(), "gemini");
        assert_eq!(config.effective_model(), DEFAULT_MODEL);
        assert_eq!(config.request_delay_ms, 0);
        assert_eq!(config.leaderboard_path, PathBuf::from("candidatures.csv"));
    }

    #[test]
    fn gemini_credential_is_found() {
        let found = require_credential_with("gemini", |key| {
            (key == "GEMINI_API_KEY").then(|| "secret".to_string())
        })
        .unwrap();
        assert_eq!(found, Some("GEMINI_API_KEY"));
    }

    #[test]
    fn missing_credential_is_an_error() {
        let err = require_credential_with("openai", |_| None).unwrap_err();
        match err {
            AtsError::MissingCredential { var } => assert_eq!(var, "OPENAI_API_KEY"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let result = require_credential_with("anthropic", |_| Some("   ".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn local_provider_needs_no_credential() {
        assert_eq!(require_credential_with("ollama", |_| None).unwrap(), None);
    }

    #[test]
    fn server_socket_addr() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8501);
    }
}
