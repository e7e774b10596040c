use anyhow::Result;
use parley_llm::{AdapterConfig, ContentGenerator, GenerateContentRequest, Message, OpenAICompatibleClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // PARLEY_BACKEND, PARLEY_API_KEY, PARLEY_MODEL, ... (or parley.toml)
    let config = AdapterConfig::load()?;
    let client = OpenAICompatibleClient::new(config)?;

    let request = GenerateContentRequest::new(vec![Message::user("What is the capital of France?")])
        .with_system_instruction("Answer in one sentence.");

    let response = client.generate_content(request).await?;

    if let Some(thinking) = response.thinking() {
        println!("[THINKING]\n{}\n", thinking);
    }
    println!("Response: {}", response.text());

    if let Some(usage) = response.usage {
        println!(
            "\nTokens: {} prompt + {} completion = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(())
}
