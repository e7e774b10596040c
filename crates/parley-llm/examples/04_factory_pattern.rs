use anyhow::Result;
use parley_llm::{
    AdapterConfig, BackendKind, ClientFactory, ContentGenerator, CountTokensRequest, EmbedContentRequest,
    GenerateContentRequest, Message,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Backend Factory Pattern Example");
    println!("===============================\n");

    // In a real application the backend comes from parley.toml or PARLEY_BACKEND
    let backend = match std::env::var("LLM_BACKEND").as_deref() {
        Ok("deepseek") => BackendKind::DeepSeek,
        Ok("qwen") => BackendKind::Qwen,
        Ok("ollama") => BackendKind::Ollama,
        _ => BackendKind::OpenAI,
    };
    let api_key = std::env::var("LLM_API_KEY").unwrap_or_default();

    let config = AdapterConfig::new(backend, api_key);
    println!("Selected backend: {} ({})", backend, config.model()?);

    let client: Arc<dyn ContentGenerator> = ClientFactory::create_client(config)?;

    let contents = vec![Message::user("Say hello!")];

    let tokens = client.count_tokens(CountTokensRequest::new(contents.clone())).await?;
    println!("Prompt tokens: {}", tokens);

    let response = client.generate_content(GenerateContentRequest::new(contents)).await?;
    println!("Response: {}\n", response.text());

    match client
        .embed_content(EmbedContentRequest::new(vec!["hello world".to_string()]))
        .await
    {
        Ok(embeddings) => println!(
            "Embedding dimensions: {}",
            embeddings.embeddings.first().map_or(0, Vec::len)
        ),
        Err(e) if e.is_not_configured() => println!("Embeddings skipped: {}", e),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
