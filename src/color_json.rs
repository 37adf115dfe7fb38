//! Purpose: Render the decoded body as two-space indented JSON, optionally colored.
//! Exports: `render_pretty`.
//! Role: Pure formatter used by the stdout emission path.
//! Invariants: Strings are ASCII-only; other code points become `\uXXXX` (UTF-16 units).
//! Invariants: Without color and for ASCII-only input, output equals `serde_json::to_string_pretty`.
//! Invariants: Numbers are emitted as written in the input.
//! Invariants: ANSI escapes appear only when color is requested.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

// Plain 8-color codes; bright variants wash out on light themes.
struct Palette {
    key: &'static str,
    string: &'static str,
    number: &'static str,
    literal: &'static str,
    punct: &'static str,
}

static PALETTE: Palette = Palette {
    key: "34",
    string: "32",
    number: "33",
    literal: "35",
    punct: "39",
};

struct Renderer {
    palette: Option<&'static Palette>,
    out: String,
}

pub fn render_pretty(value: &Value, use_color: bool) -> String {
    let mut renderer = Renderer {
        palette: use_color.then_some(&PALETTE),
        out: String::new(),
    };
    renderer.value(value, 0);
    renderer.out
}

impl Renderer {
    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.token("null", |p| p.literal),
            Value::Bool(flag) => self.token(if *flag { "true" } else { "false" }, |p| p.literal),
            Value::Number(num) => self.token(&num.to_string(), |p| p.number),
            Value::String(text) => self.token(&quote(text), |p| p.string),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.token("[]", |p| p.punct);
            return;
        }
        self.token("[", |p| p.punct);
        for (idx, item) in items.iter().enumerate() {
            self.separator(idx, depth + 1);
            self.value(item, depth + 1);
        }
        self.close("]", depth);
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.token("{}", |p| p.punct);
            return;
        }
        self.token("{", |p| p.punct);
        for (idx, (key, item)) in map.iter().enumerate() {
            self.separator(idx, depth + 1);
            self.token(&quote(key), |p| p.key);
            self.token(":", |p| p.punct);
            self.out.push(' ');
            self.value(item, depth + 1);
        }
        self.close("}", depth);
    }

    // Comma after the previous member (if any), then newline and indent.
    fn separator(&mut self, idx: usize, depth: usize) {
        if idx > 0 {
            self.token(",", |p| p.punct);
        }
        self.out.push('\n');
        self.out.push_str(&INDENT.repeat(depth));
    }

    fn close(&mut self, bracket: &str, depth: usize) {
        self.out.push('\n');
        self.out.push_str(&INDENT.repeat(depth));
        self.token(bracket, |p| p.punct);
    }

    fn token(&mut self, text: &str, color: impl Fn(&Palette) -> &'static str) {
        match self.palette {
            Some(palette) => {
                self.out.push_str("\u{1b}[");
                self.out.push_str(color(palette));
                self.out.push('m');
                self.out.push_str(text);
                self.out.push_str("\u{1b}[0m");
            }
            None => self.out.push_str(text),
        }
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::render_pretty;
    use serde_json::json;

    #[test]
    fn plain_output_matches_serde_pretty() {
        let value = json!({
            "arr": [1, true, null, []],
            "nested": {"x": "y\n\"quoted\"", "empty": {}},
            "text": "tab\there",
            "float": 1.5
        });
        let pretty = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(render_pretty(&value, false), pretty);
    }

    #[test]
    fn non_ascii_is_escaped_as_utf16_units() {
        let value = json!({"t": "caf\u{e9}", "e": "\u{1f600}", "k\u{e9}y": "\u{7f}\u{1}"});
        assert_eq!(
            render_pretty(&value, false),
            "{\n  \"t\": \"caf\\u00e9\",\n  \"e\": \"\\ud83d\\ude00\",\n  \"k\\u00e9y\": \"\\u007f\\u0001\"\n}"
        );
    }

    #[test]
    fn big_numbers_keep_their_digits() {
        let value: serde_json::Value =
            serde_json::from_str(r#"[123456789012345678901234567890, 3.14159265358979323846]"#)
                .expect("parse");
        assert_eq!(
            render_pretty(&value, false),
            "[\n  123456789012345678901234567890,\n  3.14159265358979323846\n]"
        );
    }

    #[test]
    fn single_key_object_uses_two_space_indent() {
        assert_eq!(render_pretty(&json!({"a": 1}), false), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn color_wraps_tokens_in_ansi_escapes() {
        let value = json!({"k": "v", "n": 1, "b": false, "z": null});
        let colored = render_pretty(&value, true);
        assert!(colored.contains("\u{1b}[34m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mfalse\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mnull\u{1b}[0m"));
    }
}
