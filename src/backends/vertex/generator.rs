use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use gcp_auth::TokenProvider;
use reqwest::Client;
use tracing::{debug, warn};

use super::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, VertexContent, VertexPart,
};
use crate::composer::compose;
use crate::config::VertexConfig;
use crate::generator::{BLOCKING_TIMEOUT, CONNECT_TIMEOUT, Generator, STREAM_TEMPERATURE};
use crate::sse::SseDecoderExt;
use crate::types::{Message, Role, TokenStream};
use crate::Error;

const BACKEND_NAME: &str = "vertex-gemini";
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Generator calling Gemini models through the Vertex AI REST surface.
pub struct VertexGeminiGenerator {
    client: Client,
    config: VertexConfig,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl VertexGeminiGenerator {
    /// Create a generator from an explicit configuration.
    ///
    /// When the configuration carries no access token, Application Default
    /// Credentials are resolved here (honoring
    /// `GOOGLE_APPLICATION_CREDENTIALS`), and a fresh token is acquired per
    /// request.
    pub async fn new(config: VertexConfig) -> Result<Self, Error> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        let token_provider = if config.access_token.is_none() {
            let provider = gcp_auth::provider().await.map_err(|e| {
                Error::auth(format!(
                    "failed to resolve application default credentials: {e}"
                ))
            })?;
            Some(provider)
        } else {
            None
        };
        Ok(Self {
            client,
            config,
            token_provider,
        })
    }

    fn endpoint(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        let sse_param = if stream { "?alt=sse" } else { "" };

        if let Some(base_url) = &self.config.base_url {
            format!(
                "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:{}{}",
                base_url.trim_end_matches('/'),
                self.config.project_id,
                self.config.location,
                self.config.model,
                method,
                sse_param
            )
        } else {
            format!(
                "https://{}-aiplatform.googleapis.com/v1/projects/{}/locations/{}/publishers/google/models/{}:{}{}",
                self.config.location,
                self.config.project_id,
                self.config.location,
                self.config.model,
                method,
                sse_param
            )
        }
    }

    /// Convert the composed prompt into the Vertex request shape.
    ///
    /// The system message moves into the dedicated `system_instruction`
    /// slot; assistant turns become "model" content.
    fn convert_messages(messages: Vec<Message>, streaming: bool) -> GenerateContentRequest {
        let mut contents = Vec::new();
        let mut system_instruction = None;

        for message in messages {
            let parts = vec![VertexPart {
                text: message.content,
            }];
            match message.role {
                Role::System => {
                    system_instruction = Some(VertexContent {
                        role: "user".to_string(),
                        parts,
                    });
                }
                Role::User => contents.push(VertexContent {
                    role: "user".to_string(),
                    parts,
                }),
                Role::Assistant => contents.push(VertexContent {
                    role: "model".to_string(),
                    parts,
                }),
            }
        }

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: streaming.then(|| GenerationConfig {
                temperature: Some(STREAM_TEMPERATURE),
            }),
        }
    }

    /// Issue the request with bearer auth. The total deadline is attached
    /// on the blocking path only; streams stay open past it.
    async fn authorized_post(
        &self,
        stream: bool,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, Error> {
        let mut builder = self.client.post(self.endpoint(stream)).json(request);
        if !stream {
            builder = builder.timeout(BLOCKING_TIMEOUT);
        }

        builder = if let Some(token) = &self.config.access_token {
            builder.header("Authorization", format!("Bearer {token}"))
        } else {
            let provider = self.token_provider.as_ref().ok_or_else(|| {
                Error::auth("application default credentials were not initialized")
            })?;
            let token = provider
                .token(&[CLOUD_PLATFORM_SCOPE])
                .await
                .map_err(|e| Error::auth(format!("failed to acquire access token: {e}")))?;
            builder.header("Authorization", format!("Bearer {}", token.as_str()))
        };

        let response = builder.send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::backend(
                BACKEND_NAME,
                format!("API error: {error_text}"),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl Generator for VertexGeminiGenerator {
    async fn generate(
        &self,
        queries: &[String],
        context: &[String],
        conversation: &[Message],
    ) -> Result<String, Error> {
        let request = Self::convert_messages(compose(queries, context, conversation), false);
        debug!(
            target: "raggen::vertex",
            model = %self.config.model,
            "issuing blocking generateContent"
        );

        let response = self.authorized_post(false, &request).await?;
        let completion: GenerateContentResponse = response.json().await?;
        let candidate = completion
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::backend(BACKEND_NAME, "response carried no candidates"))?;

        Ok(candidate
            .content
            .map(|content| content.parts.into_iter().map(|part| part.text).collect())
            .unwrap_or_default())
    }

    async fn generate_stream(
        &self,
        queries: &[String],
        context: &[String],
        conversation: &[Message],
    ) -> Result<TokenStream, Error> {
        let request = Self::convert_messages(compose(queries, context, conversation), true);
        debug!(
            target: "raggen::vertex",
            model = %self.config.model,
            "opening generateContent stream"
        );

        let response = self.authorized_post(true, &request).await?;

        let events = response
            .bytes_stream()
            .sse_events()
            .map(|decoded| match decoded {
                Ok(event) => {
                    if event.is_done() || event.data.trim().is_empty() {
                        return Vec::new();
                    }
                    match serde_json::from_str::<GenerateContentResponse>(&event.data) {
                        Ok(chunk) => chunk.into_token_events().into_iter().map(Ok).collect(),
                        Err(e) => {
                            warn!(target: "raggen::vertex", error = %e, "undecodable stream chunk");
                            vec![Err(Error::Serialization(e))]
                        }
                    }
                }
                Err(e) => vec![Err(e)],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Box::pin(events))
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn description(&self) -> &str {
        "Answer generation using Google's Gemini models on Vertex AI"
    }

    fn context_window(&self) -> usize {
        10_000
    }
}
