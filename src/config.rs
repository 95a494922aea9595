use std::env;

use crate::backends::{ChatCompletionsGenerator, VertexGeminiGenerator};
use crate::generator::Generator;
use crate::Error;

const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-preview-0409";
const DEFAULT_VERTEX_LOCATION: &str = "us-central1";

/// Routing mode for the chat completions backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiFlavor {
    /// Standard bearer-token routing against an OpenAI-compatible endpoint.
    #[default]
    OpenAi,
    /// Azure-style routing: `api-key` header plus a `deployment_id` selector
    /// named after the model.
    AzureDeployment,
}

/// Configuration for the chat completions backend.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub api_version: Option<String>,
    pub flavor: ApiFlavor,
}

impl ChatConfig {
    /// Create a configuration with default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            api_version: None,
            flavor: ApiFlavor::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_flavor(mut self, flavor: ApiFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Read the chat backend settings from the environment.
    ///
    /// Only `OPENAI_API_KEY` is required. `RAGGEN_MODEL` overrides the
    /// model, `OPENAI_BASE_URL` or `OPENAI_API_BASE` override the endpoint
    /// (the latter wins when both are set), `OPENAI_API_VERSION` adds the
    /// version query parameter, and `OPENAI_API_TYPE=azure` switches to
    /// deployment routing.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::config("OPENAI_API_KEY environment variable is required for the chat backend")
        })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("RAGGEN_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("OPENAI_API_BASE").or_else(|_| env::var("OPENAI_BASE_URL")) {
            config.base_url = base_url;
        }
        if let Ok(api_version) = env::var("OPENAI_API_VERSION") {
            config.api_version = Some(api_version);
        }
        if matches!(env::var("OPENAI_API_TYPE").as_deref(), Ok("azure")) {
            config.flavor = ApiFlavor::AzureDeployment;
        }
        Ok(config)
    }
}

/// Configuration for the Vertex AI Gemini backend.
#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project_id: String,
    pub location: String,
    pub model: String,
    /// Explicit access token. When absent, Application Default Credentials
    /// are used instead.
    pub access_token: Option<String>,
    /// Endpoint override for testing against a local server.
    pub base_url: Option<String>,
}

impl VertexConfig {
    /// Create a configuration with default region and model.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            location: DEFAULT_VERTEX_LOCATION.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            access_token: None,
            base_url: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read the Vertex backend settings from the environment.
    ///
    /// Only `GOOGLE_CLOUD_PROJECT` is required. `GOOGLE_CLOUD_REGION`
    /// overrides the region, `GEMINI_MODEL` overrides the model, and
    /// `VERTEX_ACCESS_TOKEN` selects explicit-token authentication instead
    /// of Application Default Credentials.
    pub fn from_env() -> Result<Self, Error> {
        let project_id = env::var("GOOGLE_CLOUD_PROJECT").map_err(|_| {
            Error::config(
                "GOOGLE_CLOUD_PROJECT environment variable is required for the vertex-gemini backend",
            )
        })?;

        let mut config = Self::new(project_id);
        if let Ok(location) = env::var("GOOGLE_CLOUD_REGION") {
            config.location = location;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(access_token) = env::var("VERTEX_ACCESS_TOKEN") {
            config.access_token = Some(access_token);
        }
        Ok(config)
    }
}

/// Configuration selecting and parameterizing a backend.
#[derive(Debug, Clone)]
pub enum GeneratorConfig {
    Chat(ChatConfig),
    VertexGemini(VertexConfig),
}

impl GeneratorConfig {
    /// Chat completions backend with default model and endpoint.
    pub fn chat(api_key: impl Into<String>) -> Self {
        Self::Chat(ChatConfig::new(api_key))
    }

    /// Vertex Gemini backend with default region and model.
    pub fn vertex(project_id: impl Into<String>) -> Self {
        Self::VertexGemini(VertexConfig::new(project_id))
    }

    /// Create configuration from environment variables.
    ///
    /// `RAGGEN_BACKEND` selects the backend explicitly. Without it, the
    /// backend is inferred from which credentials are present: an OpenAI
    /// key selects the chat backend, otherwise a Google Cloud project
    /// selects the Vertex backend.
    pub fn from_env() -> Result<Self, Error> {
        if let Ok(backend) = env::var("RAGGEN_BACKEND") {
            return match backend.to_lowercase().as_str() {
                "chat" => Ok(Self::Chat(ChatConfig::from_env()?)),
                "vertex-gemini" => Ok(Self::VertexGemini(VertexConfig::from_env()?)),
                _ => Err(Error::config(format!(
                    "Invalid RAGGEN_BACKEND '{backend}'. Valid values are: chat, vertex-gemini"
                ))),
            };
        }

        if env::var("OPENAI_API_KEY").is_ok() {
            return Ok(Self::Chat(ChatConfig::from_env()?));
        }
        if env::var("GOOGLE_CLOUD_PROJECT").is_ok() {
            return Ok(Self::VertexGemini(VertexConfig::from_env()?));
        }

        Err(Error::config(
            "No backend credentials found in environment. Set RAGGEN_BACKEND (chat/vertex-gemini) with appropriate credentials",
        ))
    }
}

/// Factory for creating generators.
pub struct GeneratorFactory;

impl GeneratorFactory {
    /// Create a generator from configuration.
    pub async fn create(config: GeneratorConfig) -> Result<Box<dyn Generator>, Error> {
        match config {
            GeneratorConfig::Chat(config) => Ok(Box::new(ChatCompletionsGenerator::new(config)?)),
            GeneratorConfig::VertexGemini(config) => {
                Ok(Box::new(VertexGeminiGenerator::new(config).await?))
            }
        }
    }

    /// Create a generator from environment variables.
    ///
    /// The environment is read afresh on every call, so two generators
    /// built back to back can target different backends without shared
    /// global state.
    pub async fn from_env() -> Result<Box<dyn Generator>, Error> {
        Self::create(GeneratorConfig::from_env()?).await
    }
}
