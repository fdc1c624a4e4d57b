//! Locating the JSON object inside a model response.
//!
//! Models wrap their answer in reasoning blocks, markdown fences or a
//! sentence of prose even when told not to. These helpers find the object;
//! they do not change a single byte of it.

/// Strip reasoning blocks and trim. Applied to every response first.
pub fn preprocess(text: &str) -> String {
    strip_think_tags(text).trim().to_string()
}

/// Remove `<think>...</think>` and `<thinking>...</thinking>` blocks.
///
/// An unclosed block swallows the rest of the text.
///
/// ```
/// use quiz_pipeline::output_parser::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>hmm</think>{}"), "{}");
/// assert_eq!(strip_think_tags("<thinking>never closed"), "");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    let once = strip_block(text, "<think>", "</think>");
    strip_block(&once, "<thinking>", "</thinking>")
}

fn strip_block(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        match rest[start..].find(close) {
            Some(end) => rest = &rest[start + end + close.len()..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Content of the first fenced code block, preferring one tagged `json`.
///
/// ```
/// use quiz_pipeline::output_parser::extract::fenced_block;
///
/// let text = "Sure:\n```json\n{\"a\": 1}\n```";
/// assert_eq!(fenced_block(text), Some("{\"a\": 1}"));
/// ```
pub fn fenced_block(text: &str) -> Option<&str> {
    let blocks = fenced_blocks(text);
    blocks
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case("json"))
        .or_else(|| blocks.first())
        .map(|(_, content)| *content)
}

/// All complete fenced blocks as `(language_hint, trimmed_content)`.
fn fenced_blocks(text: &str) -> Vec<(&str, &str)> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let Some(line_end) = after.find('\n') else {
            break;
        };
        let lang = after[..line_end].trim();
        let body = &after[line_end + 1..];
        let Some(close) = body.find("```") else {
            break;
        };
        blocks.push((lang, body[..close].trim()));
        rest = &body[close + 3..];
    }
    blocks
}

/// The last top-level `{...}` region, string- and escape-aware.
///
/// The last one is preferred since models tend to restate the schema or an
/// example before giving the real answer.
///
/// ```
/// use quiz_pipeline::output_parser::extract::last_json_object;
///
/// let text = r#"Here you go: {"answer": "x {y}"} done"#;
/// assert_eq!(last_json_object(text), Some(r#"{"answer": "x {y}"}"#));
/// ```
pub fn last_json_object(text: &str) -> Option<&str> {
    let mut best = None;
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    best = Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    best
}
