use futures::StreamExt;
use parley_llm::{decode_stream, GenerateContentResponse, LlmError, Part, StreamDecoder};
use serde_json::json;

fn content_record(content: &str) -> String {
    format!("data: {}\n\n", json!({"choices": [{"delta": {"content": content}}]}))
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body: String = fragments.iter().map(|f| content_record(f)).collect();
    body.push_str("data: [DONE]\n\n");
    body
}

async fn decode(chunks: Vec<Vec<u8>>, extract_thinking: bool) -> Vec<GenerateContentResponse> {
    let bytes = futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
    decode_stream(bytes, StreamDecoder::new(extract_thinking))
        .map(|item| item.unwrap())
        .collect()
        .await
}

fn channels(partials: &[GenerateContentResponse]) -> (Vec<String>, Vec<String>) {
    let mut main = Vec::new();
    let mut thinking = Vec::new();
    for part in partials.iter().flat_map(|p| &p.parts) {
        match part {
            Part::Text(text) => main.push(text.clone()),
            Part::Thinking(text) => thinking.push(text.clone()),
            other => panic!("unexpected part {:?}", other),
        }
    }
    (main, thinking)
}

#[tokio::test]
async fn test_delimiter_split_across_fragments() {
    let body = sse_body(&["Let me <thi", "nking>rea", "son</thinking> done"]);

    let partials = decode(vec![body.into_bytes()], true).await;

    let (main, thinking) = channels(&partials);
    assert_eq!(main, vec!["Let me ", " done"]);
    assert_eq!(thinking, vec!["reason"]);
}

#[tokio::test]
async fn test_every_fragment_boundary() {
    let text = "Let me <thinking>reason</thinking> done";

    for i in 0..=text.len() {
        for j in i..=text.len() {
            let body = sse_body(&[&text[..i], &text[i..j], &text[j..]]);

            let partials = decode(vec![body.into_bytes()], true).await;

            let (main, thinking) = channels(&partials);
            assert_eq!(main.concat(), "Let me  done", "split at {} and {}", i, j);
            assert_eq!(thinking.concat(), "reason", "split at {} and {}", i, j);
        }
    }
}

#[tokio::test]
async fn test_every_byte_boundary_of_transport() {
    let body = sse_body(&["答案 <think>", "推理", "</think> 完成"]).into_bytes();

    for split in 0..=body.len() {
        let chunks = vec![body[..split].to_vec(), body[split..].to_vec()];

        let partials = decode(chunks, true).await;

        let (main, thinking) = channels(&partials);
        assert_eq!(main.concat(), "答案  完成", "split at byte {}", split);
        assert_eq!(thinking.concat(), "推理", "split at byte {}", split);
    }
}

#[tokio::test]
async fn test_malformed_record_does_not_interrupt_stream() {
    let body = format!(
        "{}data: {{\"choices\": [{{\"delta\"\n\n{}data: [DONE]\n\n",
        content_record("before"),
        content_record("after")
    );

    let partials = decode(vec![body.into_bytes()], true).await;

    let (main, _) = channels(&partials);
    assert_eq!(main, vec!["before", "after"]);
}

#[tokio::test]
async fn test_unterminated_thinking_span() {
    let body = sse_body(&["answer <think>never", " closed"]);

    let partials = decode(vec![body.into_bytes()], true).await;

    let (main, thinking) = channels(&partials);
    assert_eq!(main.concat(), "answer ");
    assert!(thinking.is_empty());
}

#[tokio::test]
async fn test_records_after_done_are_ignored() {
    let mut body = sse_body(&["one"]);
    body.push_str(&content_record("two"));

    let partials = decode(vec![body.into_bytes()], true).await;

    let (main, _) = channels(&partials);
    assert_eq!(main, vec!["one"]);
}

#[tokio::test]
async fn test_stream_without_done_still_flushes() {
    let body = content_record("tail <thi");

    let partials = decode(vec![body.into_bytes()], true).await;

    let (main, _) = channels(&partials);
    assert_eq!(main.concat(), "tail <thi");
}

#[tokio::test]
async fn test_streamed_tool_call_and_usage() {
    let records = [
        json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "id": "call_a", "function": {"name": "search", "arguments": ""}}]}}]}),
        json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": "{\"q\":"}}]}}]}),
        json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": "\"rust\"}"}}]}}]}),
        json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}),
        json!({"choices": [], "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}}),
    ];
    let mut body: String = records.iter().map(|r| format!("data: {}\n\n", r)).collect();
    body.push_str("data: [DONE]\n\n");

    let partials = decode(vec![body.into_bytes()], true).await;

    assert_eq!(partials.len(), 2);
    let calls = partials[0].function_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id.as_deref(), Some("call_a"));
    assert_eq!(calls[0].name, "search");
    assert_eq!(calls[0].args.get("q"), Some(&json!("rust")));

    assert!(partials[1].is_empty());
    assert_eq!(partials[1].usage.map(|u| u.total_tokens), Some(17));
}

#[tokio::test]
async fn test_read_error_ends_stream() {
    let items = vec![
        Ok(content_record("partial").into_bytes()),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer")),
        Ok(content_record("never").into_bytes()),
    ];

    let results: Vec<_> = decode_stream(futures::stream::iter(items), StreamDecoder::new(true))
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().text(), "partial");
    assert!(matches!(&results[1], Err(LlmError::Stream(msg)) if msg.contains("reset by peer")));
}

#[tokio::test]
async fn test_thinking_passthrough_when_disabled() {
    let body = sse_body(&["<think>x</think>y"]);

    let partials = decode(vec![body.into_bytes()], false).await;

    let (main, thinking) = channels(&partials);
    assert_eq!(main.concat(), "<think>x</think>y");
    assert!(thinking.is_empty());
}

#[tokio::test]
async fn test_null_delta_record_carries_usage() {
    let body = format!(
        "{}data: {}\n\ndata: [DONE]\n\n",
        content_record("hi"),
        json!({
            "choices": [{"delta": null, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        })
    );

    let partials = decode(vec![body.into_bytes()], true).await;

    let (main, _) = channels(&partials);
    assert_eq!(main, vec!["hi"]);
    assert_eq!(partials.last().and_then(|p| p.usage).map(|u| u.total_tokens), Some(4));
}
