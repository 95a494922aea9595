use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ChatChunk, ChatCompletion, ChatRequest};
use crate::composer::compose;
use crate::config::{ApiFlavor, ChatConfig};
use crate::generator::{BLOCKING_TIMEOUT, CONNECT_TIMEOUT, Generator, STREAM_TEMPERATURE};
use crate::sse::SseDecoderExt;
use crate::types::{Message, TokenStream};
use crate::Error;

const BACKEND_NAME: &str = "chat-completions";

/// Generator speaking the OpenAI-compatible chat completions protocol,
/// including deployment-style routing for Azure-hosted endpoints.
pub struct ChatCompletionsGenerator {
    client: Client,
    config: ChatConfig,
}

impl ChatCompletionsGenerator {
    /// Create a generator from an explicit configuration.
    ///
    /// The client bounds connection establishment only. The total deadline
    /// is attached per request on the blocking path, so token streams stay
    /// open past it.
    pub fn new(config: ChatConfig) -> Result<Self, Error> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Assemble the outgoing request body. Deployment routing adds the
    /// `deployment_id` selector; the composed messages are identical in both
    /// routing modes.
    fn build_request(&self, messages: Vec<Message>, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            deployment_id: matches!(self.config.flavor, ApiFlavor::AzureDeployment)
                .then(|| self.config.model.clone()),
            temperature: stream.then_some(STREAM_TEMPERATURE),
            stream: stream.then_some(true),
        }
    }

    fn post(&self, request: &ChatRequest) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(self.endpoint()).json(request);
        if let Some(version) = &self.config.api_version {
            builder = builder.query(&[("api-version", version)]);
        }
        match self.config.flavor {
            ApiFlavor::OpenAi => {
                builder.header("Authorization", format!("Bearer {}", self.config.api_key))
            }
            ApiFlavor::AzureDeployment => builder.header("api-key", self.config.api_key.as_str()),
        }
    }
}

#[async_trait]
impl Generator for ChatCompletionsGenerator {
    async fn generate(
        &self,
        queries: &[String],
        context: &[String],
        conversation: &[Message],
    ) -> Result<String, Error> {
        let request = self.build_request(compose(queries, context, conversation), false);
        debug!(
            target: "raggen::chat",
            model = %request.model,
            messages = request.messages.len(),
            "issuing blocking completion"
        );

        let response = self.post(&request).timeout(BLOCKING_TIMEOUT).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::backend(BACKEND_NAME, format!("API error: {error_text}")));
        }

        let completion: ChatCompletion = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::backend(BACKEND_NAME, "completion carried no choices"))?;
        Ok(choice.message.content)
    }

    async fn generate_stream(
        &self,
        queries: &[String],
        context: &[String],
        conversation: &[Message],
    ) -> Result<TokenStream, Error> {
        let request = self.build_request(compose(queries, context, conversation), true);
        debug!(target: "raggen::chat", model = %request.model, "opening completion stream");

        let response = self.post(&request).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::backend(BACKEND_NAME, format!("API error: {error_text}")));
        }

        let events = response
            .bytes_stream()
            .sse_events()
            .filter_map(|decoded| async move {
                match decoded {
                    Ok(event) => {
                        if event.is_done() || event.data.trim().is_empty() {
                            return None;
                        }
                        match serde_json::from_str::<ChatChunk>(&event.data) {
                            Ok(chunk) => chunk.into_token_event().map(Ok),
                            Err(e) => {
                                warn!(target: "raggen::chat", error = %e, "undecodable stream chunk");
                                Some(Err(Error::Serialization(e)))
                            }
                        }
                    }
                    Err(e) => Some(Err(e)),
                }
            });

        Ok(Box::pin(events))
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn description(&self) -> &str {
        "Answer generation through an OpenAI-compatible chat completions API"
    }

    fn context_window(&self) -> usize {
        10_000
    }
}
