use std::env;

use raggen::{ApiFlavor, GeneratorConfig, GeneratorFactory, VertexConfig};

/// Environment-driven selection is exercised in one test so the individual
/// scenarios cannot race each other over process-global variables.
#[test]
fn test_backend_selection_from_env() {
    let vars = [
        "RAGGEN_BACKEND",
        "RAGGEN_MODEL",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "OPENAI_API_BASE",
        "OPENAI_API_VERSION",
        "OPENAI_API_TYPE",
        "GOOGLE_CLOUD_PROJECT",
        "GOOGLE_CLOUD_REGION",
        "GEMINI_MODEL",
        "VERTEX_ACCESS_TOKEN",
    ];
    let clear = || {
        for var in vars {
            env::remove_var(var);
        }
    };

    // No credentials at all.
    clear();
    assert!(GeneratorConfig::from_env().is_err());

    // An OpenAI key infers the chat backend.
    clear();
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("RAGGEN_MODEL", "gpt-4o-mini");
    env::set_var("OPENAI_BASE_URL", "https://first.example.test");
    env::set_var("OPENAI_API_BASE", "https://second.example.test");
    match GeneratorConfig::from_env().unwrap() {
        GeneratorConfig::Chat(config) => {
            assert_eq!(config.api_key, "sk-test");
            assert_eq!(config.model, "gpt-4o-mini");
            // OPENAI_API_BASE wins over OPENAI_BASE_URL.
            assert_eq!(config.base_url, "https://second.example.test");
            assert_eq!(config.flavor, ApiFlavor::OpenAi);
        }
        other => panic!("expected chat config, got {other:?}"),
    }

    // Azure-style routing mode.
    clear();
    env::set_var("OPENAI_API_KEY", "azure-key");
    env::set_var("OPENAI_API_TYPE", "azure");
    env::set_var("OPENAI_API_VERSION", "2024-02-01");
    match GeneratorConfig::from_env().unwrap() {
        GeneratorConfig::Chat(config) => {
            assert_eq!(config.flavor, ApiFlavor::AzureDeployment);
            assert_eq!(config.api_version.as_deref(), Some("2024-02-01"));
        }
        other => panic!("expected chat config, got {other:?}"),
    }

    // A Google project without an OpenAI key infers the Vertex backend.
    clear();
    env::set_var("GOOGLE_CLOUD_PROJECT", "my-project");
    env::set_var("GEMINI_MODEL", "gemini-1.5-flash");
    env::set_var("VERTEX_ACCESS_TOKEN", "token");
    match GeneratorConfig::from_env().unwrap() {
        GeneratorConfig::VertexGemini(config) => {
            assert_eq!(config.project_id, "my-project");
            assert_eq!(config.location, "us-central1");
            assert_eq!(config.model, "gemini-1.5-flash");
            assert_eq!(config.access_token.as_deref(), Some("token"));
        }
        other => panic!("expected vertex config, got {other:?}"),
    }

    // The explicit selector overrides credential inference.
    clear();
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("GOOGLE_CLOUD_PROJECT", "my-project");
    env::set_var("VERTEX_ACCESS_TOKEN", "token");
    env::set_var("RAGGEN_BACKEND", "vertex-gemini");
    assert!(matches!(
        GeneratorConfig::from_env().unwrap(),
        GeneratorConfig::VertexGemini(_)
    ));

    // Selecting a backend without its credentials is a configuration error.
    clear();
    env::set_var("RAGGEN_BACKEND", "chat");
    assert!(GeneratorConfig::from_env().is_err());

    // Unknown selector values are rejected outright.
    clear();
    env::set_var("RAGGEN_BACKEND", "smoke-signals");
    env::set_var("OPENAI_API_KEY", "sk-test");
    assert!(GeneratorConfig::from_env().is_err());

    clear();
}

#[tokio::test]
async fn test_factory_builds_named_backends() {
    let chat = GeneratorFactory::create(GeneratorConfig::chat("key"))
        .await
        .unwrap();
    assert_eq!(chat.name(), "chat-completions");
    assert!(chat.streamable());
    assert_eq!(chat.context_window(), 10_000);

    let vertex = GeneratorFactory::create(GeneratorConfig::VertexGemini(
        VertexConfig::new("proj").with_access_token("tok"),
    ))
    .await
    .unwrap();
    assert_eq!(vertex.name(), "vertex-gemini");
    assert!(vertex.streamable());
    assert_eq!(vertex.context_window(), 10_000);
}
