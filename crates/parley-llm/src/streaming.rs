use futures::{Stream, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use crate::buffer_utils::parse_sse_stream;
use crate::openai::tools::parse_arguments;
use crate::openai::translate::usage_from_wire;
use crate::openai::wire::{ChatStreamChunk, ToolCallDelta};
use crate::thinking::{Emission, StreamMode, ThinkingStream};
use crate::traits::ResponseStream;
use crate::types::{FinishReason, FunctionCall, GenerateContentResponse, Part, UsageMetadata};

const LOGGED_PAYLOAD_CHARS: usize = 200;

#[derive(Debug, Default)]
struct PendingToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Turns decoded stream chunks into canonical partial responses.
///
/// One decoder per streamed call; it owns that call's reasoning state, partially received
/// tool calls and last reported usage.
#[derive(Debug)]
pub struct StreamDecoder {
    thinking: ThinkingStream,
    extract_thinking: bool,
    /// Set once the backend streams a dedicated reasoning field; delimiters are then ignored
    reasoning_field_seen: bool,
    tool_calls: BTreeMap<u32, PendingToolCall>,
    /// Wire index (or its absence) -> key of the pending call its fragments extend
    tool_call_slots: HashMap<Option<u32>, u32>,
    usage: Option<UsageMetadata>,
}

impl StreamDecoder {
    pub fn new(extract_thinking: bool) -> Self {
        Self {
            thinking: ThinkingStream::new(),
            extract_thinking,
            reasoning_field_seen: false,
            tool_calls: BTreeMap::new(),
            tool_call_slots: HashMap::new(),
            usage: None,
        }
    }

    /// Decode one `data:` payload. A payload that isn't a valid chunk is logged and skipped.
    pub fn decode_payload(&mut self, data: &str) -> Vec<GenerateContentResponse> {
        match serde_json::from_str::<ChatStreamChunk>(data) {
            Ok(chunk) => self.handle_chunk(chunk),
            Err(e) => {
                let payload: String = data.chars().take(LOGGED_PAYLOAD_CHARS).collect();
                tracing::warn!(error = %e, payload = %payload, "Skipping malformed stream record");
                Vec::new()
            }
        }
    }

    pub fn handle_chunk(&mut self, chunk: ChatStreamChunk) -> Vec<GenerateContentResponse> {
        let mut out = Vec::new();

        if let Some(usage) = chunk.usage {
            self.usage = Some(usage_from_wire(usage));
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return out;
        };
        let delta = choice.delta.unwrap_or_default();

        for tool_call in delta.tool_calls.into_iter().flatten() {
            self.accumulate_tool_call(tool_call);
        }

        let reasoning = delta.reasoning_content.filter(|r| !r.is_empty());
        let content = delta.content.filter(|c| !c.is_empty());

        if self.extract_thinking {
            if let Some(reasoning) = reasoning {
                if !self.reasoning_field_seen {
                    self.reasoning_field_seen = true;
                    out.extend(self.thinking.finish().into_iter().map(emission_to_partial));
                }
                out.push(partial(Part::Thinking(reasoning)));
            }

            if let Some(content) = content {
                if self.reasoning_field_seen {
                    out.push(partial(Part::Text(content)));
                } else {
                    out.extend(self.thinking.push(&content).into_iter().map(emission_to_partial));
                }
            }
        } else if let Some(content) = content {
            out.push(partial(Part::Text(content)));
        }

        if choice.finish_reason.is_some() && !self.tool_calls.is_empty() {
            out.push(self.take_tool_calls());
        }

        out
    }

    /// End of stream. Held text and pending tool calls are flushed; an unterminated
    /// thinking span is dropped. Usage, if reported, rides on the last partial.
    pub fn finish(&mut self) -> Vec<GenerateContentResponse> {
        if let StreamMode::InsideThink(pair) = self.thinking.mode() {
            tracing::debug!(
                delimiter = pair.open,
                discarded_chars = self.thinking.pending_len(),
                "Discarding unterminated thinking span"
            );
        }

        let mut out: Vec<GenerateContentResponse> =
            self.thinking.finish().into_iter().map(emission_to_partial).collect();

        if !self.tool_calls.is_empty() {
            out.push(self.take_tool_calls());
        }

        if let Some(usage) = self.usage.take() {
            match out.last_mut() {
                Some(last) => last.usage = Some(usage),
                None => out.push(GenerateContentResponse::new(Vec::new(), FinishReason::Stop).with_usage(Some(usage))),
            }
        }

        out
    }

    fn accumulate_tool_call(&mut self, delta: ToolCallDelta) {
        let id = delta.id.filter(|id| !id.is_empty());
        let name = delta.function.as_ref().and_then(|f| f.name.as_deref()).filter(|n| !n.is_empty());
        let key = self.tool_call_key(delta.index, id.as_deref(), name);

        let pending = self.tool_calls.entry(key).or_default();
        if let Some(id) = id {
            pending.id = Some(id);
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                pending.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                pending.arguments.push_str(&arguments);
            }
        }
    }

    /// Pick the pending call a fragment belongs to.
    ///
    /// A fragment extends the call last seen at its wire index, unless it carries a
    /// different id. Without an index, a second name also starts a new call, since such
    /// backends send every call whole.
    fn tool_call_key(&mut self, index: Option<u32>, id: Option<&str>, name: Option<&str>) -> u32 {
        if let Some(&key) = self.tool_call_slots.get(&index) {
            let current = self.tool_calls.get(&key);
            let other_id = match (id, current.and_then(|p| p.id.as_deref())) {
                (Some(new), Some(existing)) => new != existing,
                _ => false,
            };
            let other_name = index.is_none() && name.is_some() && current.is_some_and(|p| !p.name.is_empty());
            if !other_id && !other_name {
                return key;
            }
        }

        let key = match index {
            Some(index) if !self.tool_calls.contains_key(&index) => index,
            _ => self.tool_calls.keys().next_back().map_or(0, |last| last + 1),
        };
        self.tool_call_slots.insert(index, key);
        key
    }

    fn take_tool_calls(&mut self) -> GenerateContentResponse {
        self.tool_call_slots.clear();
        let parts = std::mem::take(&mut self.tool_calls)
            .into_values()
            .map(|pending| {
                Part::FunctionCall(FunctionCall {
                    id: pending.id,
                    name: pending.name,
                    args: parse_arguments(&pending.arguments),
                })
            })
            .collect();
        GenerateContentResponse::new(parts, FinishReason::Stop)
    }
}

/// Streamed partials are never terminal; `Stop` here means "nothing to auto-continue"
fn partial(part: Part) -> GenerateContentResponse {
    GenerateContentResponse::new(vec![part], FinishReason::Stop)
}

fn emission_to_partial(emission: Emission) -> GenerateContentResponse {
    match emission {
        Emission::Main(text) => partial(Part::Text(text)),
        Emission::Thinking(text) => partial(Part::Thinking(text)),
    }
}

/// Decode an SSE byte stream into canonical partial responses.
///
/// Pull-based: nothing is read from `bytes` until the consumer asks for the next item.
/// Dropping the returned stream drops the source and the decoder state with it.
pub fn decode_stream<S, B, E>(bytes: S, mut decoder: StreamDecoder) -> ResponseStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let mut records = parse_sse_stream(bytes);

    Box::pin(async_stream::stream! {
        while let Some(record) = records.next().await {
            match record {
                Ok(data) => {
                    for partial in decoder.decode_payload(&data) {
                        yield Ok(partial);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        for partial in decoder.finish() {
            yield Ok(partial);
        }
    })
}
