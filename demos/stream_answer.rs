//! Streaming answer generation over retrieved context.
//!
//! Tokens are printed as they arrive. To run against the chat backend:
//!
//! ```bash
//! export OPENAI_API_KEY=your_api_key_here
//! cargo run --example stream_answer
//! ```

use std::io::Write;

use futures_util::StreamExt;
use raggen::{Error, GeneratorFactory};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let generator = GeneratorFactory::from_env().await?;
    println!("Using backend: {}", generator.name());

    let queries = vec!["What does the composer do?".to_string()];
    let context =
        vec!["The composer joins queries and context passages into one prompt.".to_string()];

    let mut stream = generator.generate_stream(&queries, &context, &[]).await?;
    while let Some(event) = stream.next().await {
        let event = event?;
        print!("{}", event.message);
        std::io::stdout().flush().ok();
        if let Some(reason) = event.finish_reason {
            println!("\n[finished: {reason}]");
        }
    }
    // A stream may also end without a finish reason; that is still normal
    // termination.
    println!();

    Ok(())
}
