use anyhow::Result;
use parley_llm::{
    AdapterConfig, ContentGenerator, FunctionDeclaration, FunctionResponse, GenerateContentRequest, Message,
    OpenAICompatibleClient, Part, Role, ToolSet,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = OpenAICompatibleClient::new(AdapterConfig::load()?)?;

    let tools = vec![ToolSet::new(vec![FunctionDeclaration::new(
        "get_weather",
        "Get the current weather for a city",
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City name"}
            },
            "required": ["city"]
        }),
    )])];

    let mut contents = vec![Message::user("What's the weather like in Lisbon?")];

    loop {
        let request = GenerateContentRequest::new(contents.clone()).with_tools(tools.clone());
        let response = client.generate_content(request).await?;

        if !response.has_function_calls() {
            println!("Response: {}", response.text());
            break;
        }

        let mut results = Vec::new();
        for call in response.function_calls() {
            println!("Tool call: {}({})", call.name, serde_json::Value::Object(call.args.clone()));

            // Stand-in for a real weather lookup
            let city = call.args.get("city").and_then(|c| c.as_str()).unwrap_or("unknown");
            let mut result = FunctionResponse::new(json!({"city": city, "temperature_c": 21, "sky": "clear"}))
                .with_name(&call.name);
            if let Some(id) = &call.id {
                result = result.with_id(id);
            }
            results.push(Part::FunctionResponse(result));
        }

        contents.push(Message::new(Role::Model, response.parts.clone()));
        contents.push(Message::new(Role::User, results));
    }

    Ok(())
}
