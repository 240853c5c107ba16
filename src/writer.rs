//! The DOM writer
//!
//! Renders a [JsonValue] tree back into text, either compactly or indented.
//! Rendering a tree built through the documented constructors cannot fail, so
//! the functions in this module return plain [String]s.
use std::fmt::Write;

use crate::value::JsonValue;

/// The default number of spaces per nesting depth in pretty mode
pub const DEFAULT_INDENT_SIZE: usize = 2;

/// Render the compact form of a value: no inserted whitespace, no indentation
pub fn to_string(value: &JsonValue) -> String {
    let mut buffer = String::new();
    write_value(&mut buffer, value, false, DEFAULT_INDENT_SIZE, 0);
    buffer
}

/// Render the pretty form of a value: each array/object element on its own
/// line, indented by `indent` spaces per nesting depth, with a single space
/// after each ':' separator
pub fn to_string_pretty(value: &JsonValue, indent: usize) -> String {
    let mut buffer = String::new();
    write_value(&mut buffer, value, true, indent, 0);
    buffer
}

fn write_value(buffer: &mut String, value: &JsonValue, pretty: bool, indent: usize, depth: usize) {
    match value {
        JsonValue::Null => buffer.push_str("null"),
        JsonValue::Boolean(true) => buffer.push_str("true"),
        JsonValue::Boolean(false) => buffer.push_str("false"),
        // raw text verbatim, never re-rendered from the numeric fields
        JsonValue::Number(number) => buffer.push_str(number.raw()),
        JsonValue::String(text) => write_string(buffer, text),
        JsonValue::Array(array) => {
            buffer.push('[');
            if array.is_empty() {
                buffer.push(']');
                return;
            }
            let mut first = true;
            for item in array {
                if !first {
                    buffer.push(',');
                }
                first = false;
                if pretty {
                    buffer.push('\n');
                    write_indent(buffer, indent, depth + 1);
                }
                write_value(buffer, item, pretty, indent, depth + 1);
            }
            if pretty {
                buffer.push('\n');
                write_indent(buffer, indent, depth);
            }
            buffer.push(']');
        }
        JsonValue::Object(object) => {
            buffer.push('{');
            if object.is_empty() {
                buffer.push('}');
                return;
            }
            let mut first = true;
            for (key, member) in object.iter() {
                if !first {
                    buffer.push(',');
                }
                first = false;
                if pretty {
                    buffer.push('\n');
                    write_indent(buffer, indent, depth + 1);
                }
                write_string(buffer, key);
                buffer.push(':');
                if pretty {
                    buffer.push(' ');
                }
                write_value(buffer, member, pretty, indent, depth + 1);
            }
            if pretty {
                buffer.push('\n');
                write_indent(buffer, indent, depth);
            }
            buffer.push('}');
        }
    }
}

fn write_indent(buffer: &mut String, indent: usize, depth: usize) {
    for _ in 0..indent * depth {
        buffer.push(' ');
    }
}

/// Quote and escape a text value. Only the characters the grammar requires
/// are escaped; non-ASCII text passes through untouched
fn write_string(buffer: &mut String, text: &str) {
    buffer.push('"');
    for c in text.chars() {
        match c {
            '"' => buffer.push_str("\\\""),
            '\\' => buffer.push_str("\\\\"),
            '\u{0008}' => buffer.push_str("\\b"),
            '\u{000c}' => buffer.push_str("\\f"),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            '\t' => buffer.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(buffer, "\\u{:04x}", c as u32);
            }
            c => buffer.push(c),
        }
    }
    buffer.push('"');
}

#[cfg(test)]
mod tests {
    use super::{to_string, to_string_pretty};
    use crate::value::{JsonArray, JsonNumber, JsonObject, JsonValue};

    #[test]
    fn scalars_should_render_their_canonical_forms() {
        assert_eq!(to_string(&JsonValue::Null), "null");
        assert_eq!(to_string(&JsonValue::from(true)), "true");
        assert_eq!(to_string(&JsonValue::from(false)), "false");
        assert_eq!(to_string(&JsonValue::from(42)), "42");
        assert_eq!(to_string(&JsonValue::from("test")), "\"test\"");
    }

    #[test]
    fn numbers_should_render_their_raw_text_verbatim() {
        let number = JsonNumber::from_f64(12.25).unwrap();
        assert_eq!(to_string(&JsonValue::from(number)), "12.25");
    }

    #[test]
    fn empty_containers_should_render_without_whitespace_in_both_modes() {
        let array = JsonValue::from(JsonArray::new());
        let object = JsonValue::from(JsonObject::new());
        assert_eq!(to_string(&array), "[]");
        assert_eq!(to_string(&object), "{}");
        assert_eq!(to_string_pretty(&array, 2), "[]");
        assert_eq!(to_string_pretty(&object, 2), "{}");
    }

    #[test]
    fn compact_output_should_contain_no_inserted_whitespace() {
        let mut object = JsonObject::new();
        object.insert("width", 600);
        object.insert("titles", {
            let mut array = JsonArray::new();
            array.push("a");
            array.push("b");
            array
        });
        assert_eq!(
            to_string(&JsonValue::from(object)),
            "{\"width\":600,\"titles\":[\"a\",\"b\"]}"
        );
    }

    #[test]
    fn pretty_output_should_indent_per_depth() {
        let mut inner = JsonObject::new();
        inner.insert("x", 20);
        let mut object = JsonObject::new();
        object.insert("window", inner);
        let rendered = to_string_pretty(&JsonValue::from(object), 2);
        assert_eq!(
            rendered,
            "{\n  \"window\": {\n    \"x\": 20\n  }\n}"
        );
    }

    #[test]
    fn pretty_output_should_respect_the_indent_size() {
        let mut array = JsonArray::new();
        array.push(1);
        array.push(2);
        let rendered = to_string_pretty(&JsonValue::from(array), 4);
        assert_eq!(rendered, "[\n    1,\n    2\n]");
    }

    #[test]
    fn strings_should_escape_only_what_the_grammar_requires() {
        let value = JsonValue::from("a\nb\t\"c\"\\ é☃");
        assert_eq!(to_string(&value), "\"a\\nb\\t\\\"c\\\"\\\\ é☃\"");
    }

    #[test]
    fn control_characters_should_escape_as_hex() {
        let value = JsonValue::from("a\u{0001}b");
        assert_eq!(to_string(&value), "\"a\\u0001b\"");
    }

    #[test]
    fn display_should_render_the_compact_form() {
        let mut object = JsonObject::new();
        object.insert("a", 1);
        assert_eq!(JsonValue::from(object).to_string(), "{\"a\":1}");
    }
}
