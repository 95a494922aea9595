//! Blocking answer generation over retrieved context.
//!
//! The backend is selected from the environment. For the chat backend:
//!
//! ```bash
//! export OPENAI_API_KEY=your_api_key_here
//! cargo run --example answer
//! ```
//!
//! For Gemini on Vertex AI instead:
//!
//! ```bash
//! export RAGGEN_BACKEND=vertex-gemini
//! export GOOGLE_CLOUD_PROJECT=your-project
//! cargo run --example answer
//! ```

use raggen::{Error, GeneratorFactory, Message};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let generator = GeneratorFactory::from_env().await?;
    println!(
        "Using backend: {} ({})",
        generator.name(),
        generator.description()
    );

    let queries = vec!["How do I enable the cache?".to_string()];
    let context = vec![
        "Caching is enabled with the `cache = true` setting in the [storage] section.".to_string(),
        "The cache directory defaults to ~/.cache/raggen.".to_string(),
    ];
    let conversation = vec![
        Message::user("hi"),
        Message::assistant("Hello! Ask me anything about the documentation."),
    ];

    let answer = generator
        .generate(&queries, &context, &conversation)
        .await?;
    println!("\n{answer}");

    Ok(())
}
