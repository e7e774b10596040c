//! Separation of a model's reasoning channel from its answer text.
//!
//! Backends report reasoning either in a dedicated field or inline, wrapped in one of
//! several delimiter conventions. Which convention a backend uses is not negotiated, so
//! [`DELIMITERS`] is tried in a fixed priority order.
//!
//! [`extract`] handles a complete response; [`ThinkingStream`] handles the same thing one
//! fragment at a time, where a delimiter may be split across fragments.

/// Opening and closing delimiter of an inline reasoning span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterPair {
    pub open: &'static str,
    pub close: &'static str,
}

impl DelimiterPair {
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

/// Known inline reasoning conventions, highest priority first
pub const DELIMITERS: &[DelimiterPair] = &[
    DelimiterPair::new("<thinking>", "</thinking>"),
    DelimiterPair::new("<think>", "</think>"),
    DelimiterPair::new("【思考】", "【/思考】"),
    DelimiterPair::new("[思考]", "[/思考]"),
];

/// Result of whole-response extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub thinking: Option<String>,
    pub text: String,
}

/// Split a complete response into reasoning and answer text.
///
/// A non-blank `reasoning_field` wins outright and the text is left untouched. Otherwise
/// the first delimiter pair (in priority order) that encloses a span is used: its interior
/// becomes the thinking text and the span is cut out of the answer. Both sides are trimmed
/// only when a span was removed.
pub fn extract(text: &str, reasoning_field: Option<&str>) -> Extracted {
    if let Some(reasoning) = reasoning_field.filter(|r| !r.trim().is_empty()) {
        return Extracted {
            thinking: Some(reasoning.to_string()),
            text: text.to_string(),
        };
    }

    for pair in DELIMITERS {
        let Some(start) = text.find(pair.open) else {
            continue;
        };
        let inner_start = start + pair.open.len();
        let Some(inner_len) = text[inner_start..].find(pair.close) else {
            continue;
        };
        let inner_end = inner_start + inner_len;

        let thinking = text[inner_start..inner_end].trim();
        let mut remaining = String::with_capacity(text.len());
        remaining.push_str(&text[..start]);
        remaining.push_str(&text[inner_end + pair.close.len()..]);

        return Extracted {
            thinking: (!thinking.is_empty()).then(|| thinking.to_string()),
            text: remaining.trim().to_string(),
        };
    }

    Extracted {
        thinking: None,
        text: text.to_string(),
    }
}

/// One unit of output from [`ThinkingStream`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Main(String),
    Thinking(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Outside,
    InsideThink(DelimiterPair),
}

/// Per-stream reasoning state machine.
///
/// Main text is emitted as soon as it is known not to start a delimiter. Reasoning is held
/// until its closing delimiter arrives and then emitted as one piece, so a caller never
/// sees half a thought.
#[derive(Debug)]
pub struct ThinkingStream {
    mode: StreamMode,
    pending_think: String,
    /// Tail of the last fragment that could still be the start of an opening delimiter
    held: String,
    delimiters: &'static [DelimiterPair],
}

impl Default for ThinkingStream {
    fn default() -> Self {
        Self::with_delimiters(DELIMITERS)
    }
}

impl ThinkingStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiters(delimiters: &'static [DelimiterPair]) -> Self {
        Self {
            mode: StreamMode::Outside,
            pending_think: String::new(),
            held: String::new(),
            delimiters,
        }
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Reasoning characters buffered inside an open span
    pub fn pending_len(&self) -> usize {
        self.pending_think.chars().count()
    }

    /// Feed one fragment
    pub fn push(&mut self, fragment: &str) -> Vec<Emission> {
        let mut out = Vec::new();
        let mut input = std::mem::take(&mut self.held);
        input.push_str(fragment);

        loop {
            match self.mode {
                StreamMode::Outside => match self.find_opening(&input) {
                    Some((pos, pair)) => {
                        push_main(&mut out, &input[..pos]);
                        input = input[pos + pair.open.len()..].to_string();
                        self.mode = StreamMode::InsideThink(pair);
                    }
                    None => {
                        let split = input.len() - self.partial_opening_len(&input);
                        push_main(&mut out, &input[..split]);
                        self.held = input[split..].to_string();
                        break;
                    }
                },
                StreamMode::InsideThink(pair) => {
                    // Buffered text is known to hold no closer; only its tail can start one
                    let mut search_from = self.pending_think.len().saturating_sub(pair.close.len().saturating_sub(1));
                    while !self.pending_think.is_char_boundary(search_from) {
                        search_from -= 1;
                    }
                    self.pending_think.push_str(&input);
                    input.clear();

                    let Some(offset) = self.pending_think[search_from..].find(pair.close) else {
                        break;
                    };
                    let pos = search_from + offset;
                    let thought = self.pending_think[..pos].to_string();
                    input = self.pending_think[pos + pair.close.len()..].to_string();
                    self.pending_think.clear();
                    self.mode = StreamMode::Outside;

                    if !thought.is_empty() {
                        out.push(Emission::Thinking(thought));
                    }
                }
            }
        }

        out
    }

    /// End of stream: a held partial delimiter is ordinary text, an open span is dropped
    pub fn finish(&mut self) -> Vec<Emission> {
        let mut out = Vec::new();
        let held = std::mem::take(&mut self.held);
        push_main(&mut out, &held);
        self.pending_think.clear();
        self.mode = StreamMode::Outside;
        out
    }

    /// Earliest opening delimiter; ties go to the higher-priority pair
    fn find_opening(&self, input: &str) -> Option<(usize, DelimiterPair)> {
        let mut best: Option<(usize, DelimiterPair)> = None;
        for pair in self.delimiters {
            if let Some(pos) = input.find(pair.open) {
                if best.map_or(true, |(current, _)| pos < current) {
                    best = Some((pos, *pair));
                }
            }
        }
        best
    }

    /// Length of the longest suffix that is a proper prefix of some opening delimiter
    fn partial_opening_len(&self, input: &str) -> usize {
        let longest = self.delimiters.iter().map(|p| p.open.len()).max().unwrap_or(0);
        let mut earliest = input.len().saturating_sub(longest.saturating_sub(1));
        while !input.is_char_boundary(earliest) {
            earliest += 1;
        }

        input[earliest..]
            .char_indices()
            .map(|(i, _)| earliest + i)
            .find(|&i| {
                let tail = &input[i..];
                self.delimiters.iter().any(|p| p.open.starts_with(tail))
            })
            .map_or(0, |i| input.len() - i)
    }
}

fn push_main(out: &mut Vec<Emission>, text: &str) {
    if !text.is_empty() {
        out.push(Emission::Main(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fragments: &[&str]) -> (Vec<String>, Vec<String>) {
        let mut stream = ThinkingStream::new();
        let mut emissions = Vec::new();
        for fragment in fragments {
            emissions.extend(stream.push(fragment));
        }
        emissions.extend(stream.finish());

        let mut main = Vec::new();
        let mut thinking = Vec::new();
        for emission in emissions {
            match emission {
                Emission::Main(s) => main.push(s),
                Emission::Thinking(s) => thinking.push(s),
            }
        }
        (main, thinking)
    }

    #[test]
    fn test_extract_prefers_reasoning_field() {
        let extracted = extract("<thinking>inline</thinking>answer", Some("structured"));

        assert_eq!(extracted.thinking.as_deref(), Some("structured"));
        assert_eq!(extracted.text, "<thinking>inline</thinking>answer");
    }

    #[test]
    fn test_extract_blank_reasoning_field_falls_back_to_delimiters() {
        let extracted = extract("<thinking>inline</thinking>answer", Some("  "));

        assert_eq!(extracted.thinking.as_deref(), Some("inline"));
        assert_eq!(extracted.text, "answer");
    }

    #[test]
    fn test_extract_tag_pair() {
        let extracted = extract("<thinking>\nstep one\n</thinking>\n\nThe answer is 4.", None);

        assert_eq!(extracted.thinking.as_deref(), Some("step one"));
        assert_eq!(extracted.text, "The answer is 4.");
    }

    #[test]
    fn test_extract_bracket_conventions() {
        let full_width = extract("【思考】先算一下【/思考】结果是4", None);
        assert_eq!(full_width.thinking.as_deref(), Some("先算一下"));
        assert_eq!(full_width.text, "结果是4");

        let square = extract("[思考]check[/思考] done", None);
        assert_eq!(square.thinking.as_deref(), Some("check"));
        assert_eq!(square.text, "done");
    }

    #[test]
    fn test_extract_priority_order() {
        // Both conventions present: the tag pair outranks the bracket pair
        let extracted = extract("[思考]b[/思考] <thinking>a</thinking> rest", None);

        assert_eq!(extracted.thinking.as_deref(), Some("a"));
        assert_eq!(extracted.text, "[思考]b[/思考]  rest");
    }

    #[test]
    fn test_extract_without_delimiters_is_untouched() {
        let extracted = extract("  plain answer \n", None);

        assert_eq!(extracted.thinking, None);
        assert_eq!(extracted.text, "  plain answer \n");
    }

    #[test]
    fn test_extract_unclosed_span_is_untouched() {
        let extracted = extract("<thinking>never closed", None);

        assert_eq!(extracted.thinking, None);
        assert_eq!(extracted.text, "<thinking>never closed");
    }

    #[test]
    fn test_stream_split_delimiters() {
        let (main, thinking) = run(&["Let me <thi", "nking>rea", "son</thinking> done"]);

        assert_eq!(main, vec!["Let me ", " done"]);
        assert_eq!(thinking, vec!["reason"]);
    }

    #[test]
    fn test_stream_every_split_point() {
        let text = "Let me <thinking>reason about it</thinking> done";
        let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();

        for &a in &boundaries {
            for &b in boundaries.iter().filter(|&&b| b > a) {
                let (main, thinking) = run(&[&text[..a], &text[a..b], &text[b..]]);
                assert_eq!(main.concat(), "Let me  done", "split at {a}/{b}");
                assert_eq!(thinking, vec!["reason about it"], "split at {a}/{b}");
            }
        }
    }

    #[test]
    fn test_stream_char_by_char_multibyte_delimiters() {
        let text = "前言【思考】想一想【/思考】结论";
        let chars: Vec<String> = text.chars().map(|c| c.to_string()).collect();
        let fragments: Vec<&str> = chars.iter().map(String::as_str).collect();

        let (main, thinking) = run(&fragments);

        assert_eq!(main.concat(), "前言结论");
        assert_eq!(thinking, vec!["想一想"]);
    }

    #[test]
    fn test_stream_holds_thinking_until_closed() {
        let mut stream = ThinkingStream::new();

        assert!(stream.push("<thinking>first half").is_empty());
        assert!(matches!(stream.mode(), StreamMode::InsideThink(_)));
        assert_eq!(stream.pending_len(), "first half".len());

        assert_eq!(
            stream.push(" second half</thinking>"),
            vec![Emission::Thinking("first half second half".to_string())]
        );
        assert_eq!(stream.mode(), StreamMode::Outside);
    }

    #[test]
    fn test_stream_long_span_in_tiny_fragments() {
        let mut fragments = vec!["intro <thinking>".to_string()];
        fragments.extend(std::iter::repeat("考x".to_string()).take(5_000));
        fragments.extend("</thinking>".chars().map(String::from));
        fragments.push(" outro".to_string());
        let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();

        let (main, thinking) = run(&refs);

        assert_eq!(main.concat(), "intro  outro");
        assert_eq!(thinking, vec!["考x".repeat(5_000)]);
    }

    #[test]
    fn test_stream_multibyte_closer_split_inside_span() {
        let (main, thinking) = run(&["【思考】思", "考中【", "/思", "考】", "完"]);

        assert_eq!(main, vec!["完"]);
        assert_eq!(thinking, vec!["思考中"]);
    }

    #[test]
    fn test_stream_unterminated_span_is_discarded() {
        let (main, thinking) = run(&["answer <thinking>never", " closed"]);

        assert_eq!(main, vec!["answer "]);
        assert!(thinking.is_empty());
    }

    #[test]
    fn test_stream_held_partial_opening_is_text_at_end() {
        let (main, thinking) = run(&["a < b and a <thi"]);

        assert_eq!(main.concat(), "a < b and a <thi");
        assert!(thinking.is_empty());
    }

    #[test]
    fn test_stream_multiple_spans_in_one_fragment() {
        let (main, thinking) = run(&["<think>one</think>A<thinking>two</thinking>B"]);

        assert_eq!(main, vec!["A", "B"]);
        assert_eq!(thinking, vec!["one", "two"]);
    }

    #[test]
    fn test_stream_closing_delimiter_must_match_opening() {
        let (main, thinking) = run(&["<think>x</thinking>y</think>z"]);

        assert_eq!(main, vec!["z"]);
        assert_eq!(thinking, vec!["x</thinking>y"]);
    }
}
