use anyhow::Result;
use futures::StreamExt;
use parley_llm::{AdapterConfig, ContentGenerator, GenerateContentRequest, Message, OpenAICompatibleClient, Part};
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = OpenAICompatibleClient::new(AdapterConfig::load()?)?;

    let request = GenerateContentRequest::new(vec![Message::user(
        "Explain how photosynthesis works at the molecular level.",
    )]);

    println!("Streaming response:\n");

    let mut stream = client.generate_content_stream(request).await?;
    let mut in_thinking = false;

    while let Some(partial) = stream.next().await {
        let partial = partial?;

        for part in &partial.parts {
            match part {
                Part::Thinking(text) => {
                    if !in_thinking {
                        println!("[THINKING]");
                        in_thinking = true;
                    }
                    print!("{}", text);
                }
                Part::Text(text) => {
                    if in_thinking {
                        println!("\n\n[RESPONSE]");
                        in_thinking = false;
                    }
                    print!("{}", text);
                }
                _ => {}
            }
            std::io::stdout().flush()?;
        }

        if let Some(usage) = partial.usage {
            println!("\n\nTokens used: {}", usage.total_tokens);
        }
    }

    println!("\n\nDone.");
    Ok(())
}
