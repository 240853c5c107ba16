//! A small, self-contained JSON DOM parser and writer.
//!
//! The crate models a document as a tree of [JsonValue]s, parses text into
//! that tree via recursive descent, and renders trees back out in compact or
//! indented form. Numbers retain the exact source text they were scanned
//! from, so a parse/write round trip reproduces numeric formatting exactly.
//! The original use case is reading and rewriting configuration files, which
//! is where the emphasis on textual fidelity and deterministic member
//! ordering comes from.
pub mod coords;
mod cursor;
pub mod decoders;
pub mod dom;
pub mod errors;
pub mod value;
pub mod writer;
#[cfg(test)]
mod test_macros;

pub use crate::errors::{JsonError, JsonErrorDetails, JsonErrorSource, JsonResult};
pub use crate::value::{JsonArray, JsonKind, JsonNumber, JsonObject, JsonValue};
pub use crate::writer::{to_string, to_string_pretty};

/// Parse a complete document into a [JsonValue] tree, failing with a
/// positioned [JsonError] on malformed input
pub fn parse(input: &str) -> JsonResult<JsonValue> {
    dom::Parser::default().parse_str(input)
}

/// Non-raising variant of [parse]: a failed parse yields [JsonValue::Null]
/// together with the rendered error message
pub fn try_parse(input: &str) -> (JsonValue, Option<String>) {
    dom::Parser::default().try_parse_str(input)
}
