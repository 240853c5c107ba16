//! The DOM parser
//!
//! Converts a stream of characters into a [JsonValue] tree via recursive
//! descent, dispatching on a one character lookahead. Each grammar production
//! is implemented as a private method; every failure path carries the
//! [crate::coords::Coords] at which the problem was detected, and a failed
//! parse discards any partially built tree.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::cursor::Cursor;
use crate::decoders::{DecoderSelector, Encoding};
use crate::errors::{JsonError, JsonErrorDetails, JsonErrorSource, JsonResult};
use crate::parser_error;
use crate::value::{JsonArray, JsonNumber, JsonObject, JsonValue};

/// The default limit on container nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Main JSON parser struct
pub struct Parser {
    decoders: DecoderSelector,
    encoding: Encoding,
    max_depth: usize,
}

impl Default for Parser {
    /// The default encoding is Utf-8
    fn default() -> Self {
        Self {
            decoders: Default::default(),
            encoding: Default::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Parser {
    /// Create a new instance of the parser using a specific [Encoding]
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Default::default()
        }
    }

    /// Create a new instance of the parser with a specific limit on container
    /// nesting depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Parse the contents of a file into a [JsonValue] tree
    pub fn parse_file<PathLike: AsRef<Path>>(&self, path: PathLike) -> JsonResult<JsonValue> {
        match File::open(&path) {
            Ok(f) => {
                let mut reader = BufReader::new(f);
                let mut chars = self.decoders.new_decoder(&mut reader, self.encoding);
                self.parse(&mut chars)
            }
            Err(_) => {
                parser_error!(JsonErrorDetails::InvalidFile)
            }
        }
    }

    /// Parse a byte slice into a [JsonValue] tree
    pub fn parse_bytes(&self, bytes: &[u8]) -> JsonResult<JsonValue> {
        let mut reader = BufReader::new(bytes);
        let mut chars = self.decoders.default_decoder(&mut reader);
        self.parse(&mut chars)
    }

    /// Parse a string slice into a [JsonValue] tree
    pub fn parse_str(&self, str: &str) -> JsonResult<JsonValue> {
        let mut chars = str.chars();
        self.parse(&mut chars)
    }

    /// Non-raising variant of [Parser::parse_str]: a failed parse yields
    /// [JsonValue::Null] together with the rendered error message, and never
    /// lets an error escape
    pub fn try_parse_str(&self, str: &str) -> (JsonValue, Option<String>) {
        match self.parse_str(str) {
            Ok(value) => (value, None),
            Err(err) => (JsonValue::Null, Some(err.to_string())),
        }
    }

    /// Parse exactly one document from the given character stream. Trailing
    /// whitespace is skipped; any further content fails the parse
    pub fn parse(&self, chars: &mut impl Iterator<Item = char>) -> JsonResult<JsonValue> {
        let mut cursor = Cursor::new(chars);
        let value = self.parse_value(&mut cursor, 0)?;
        cursor.skip_whitespace();
        match cursor.peek() {
            None => Ok(value),
            Some(_) => parser_error!(JsonErrorDetails::TrailingCharacters, cursor.position()),
        }
    }

    /// Dispatch to a production based on a single character of lookahead
    fn parse_value(&self, cursor: &mut Cursor, depth: usize) -> JsonResult<JsonValue> {
        cursor.skip_whitespace();
        match cursor.peek() {
            None => parser_error!(JsonErrorDetails::EndOfInput, cursor.position()),
            Some('{') => self.parse_object(cursor, depth),
            Some('[') => self.parse_array(cursor, depth),
            Some('"') => Ok(JsonValue::String(self.parse_string(cursor)?)),
            Some('t') => self.parse_keyword(cursor, "true", JsonValue::Boolean(true)),
            Some('f') => self.parse_keyword(cursor, "false", JsonValue::Boolean(false)),
            Some('n') => self.parse_keyword(cursor, "null", JsonValue::Null),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(cursor),
            Some(c) => parser_error!(JsonErrorDetails::UnexpectedCharacter(c), cursor.position()),
        }
    }

    /// An object is just a list of comma separated `"key" : value` pairs.
    /// Duplicate keys are permitted by the grammar and collapse last-write-wins
    fn parse_object(&self, cursor: &mut Cursor, depth: usize) -> JsonResult<JsonValue> {
        if depth >= self.max_depth {
            return parser_error!(
                JsonErrorDetails::NestingTooDeep(self.max_depth),
                cursor.position()
            );
        }
        cursor.advance();
        cursor.skip_whitespace();
        let mut object = JsonObject::new();
        if let Some('}') = cursor.peek() {
            cursor.advance();
            return Ok(JsonValue::Object(object));
        }
        loop {
            cursor.skip_whitespace();
            match cursor.peek() {
                Some('"') => (),
                Some(_) => {
                    return parser_error!(JsonErrorDetails::KeyExpected, cursor.position());
                }
                None => {
                    return parser_error!(JsonErrorDetails::EndOfInput, cursor.position());
                }
            }
            let key = self.parse_string(cursor)?;
            cursor.skip_whitespace();
            match cursor.advance() {
                Some((':', _)) => (),
                Some((_, coords)) => {
                    return parser_error!(JsonErrorDetails::PairExpected, coords);
                }
                None => {
                    return parser_error!(JsonErrorDetails::EndOfInput, cursor.position());
                }
            }
            object.insert(key, self.parse_value(cursor, depth + 1)?);
            cursor.skip_whitespace();
            match cursor.advance() {
                Some(('}', _)) => break,
                Some((',', _)) => (),
                Some((_, coords)) => {
                    return parser_error!(JsonErrorDetails::InvalidObject, coords);
                }
                None => {
                    return parser_error!(JsonErrorDetails::EndOfInput, cursor.position());
                }
            }
        }
        Ok(JsonValue::Object(object))
    }

    /// An array is just a list of comma separated values
    fn parse_array(&self, cursor: &mut Cursor, depth: usize) -> JsonResult<JsonValue> {
        if depth >= self.max_depth {
            return parser_error!(
                JsonErrorDetails::NestingTooDeep(self.max_depth),
                cursor.position()
            );
        }
        cursor.advance();
        cursor.skip_whitespace();
        let mut array = JsonArray::new();
        if let Some(']') = cursor.peek() {
            cursor.advance();
            return Ok(JsonValue::Array(array));
        }
        loop {
            array.push(self.parse_value(cursor, depth + 1)?);
            cursor.skip_whitespace();
            match cursor.advance() {
                Some((']', _)) => break,
                Some((',', _)) => (),
                Some((_, coords)) => {
                    return parser_error!(JsonErrorDetails::InvalidArray, coords);
                }
                None => {
                    return parser_error!(JsonErrorDetails::EndOfInput, cursor.position());
                }
            }
        }
        Ok(JsonValue::Array(array))
    }

    /// Consume and match (exactly) a literal keyword, producing the supplied
    /// value on success
    fn parse_keyword(
        &self,
        cursor: &mut Cursor,
        keyword: &'static str,
        value: JsonValue,
    ) -> JsonResult<JsonValue> {
        for expected in keyword.chars() {
            match cursor.advance() {
                Some((c, _)) if c == expected => (),
                Some((_, coords)) => {
                    return parser_error!(JsonErrorDetails::KeywordExpected(keyword), coords);
                }
                None => {
                    return parser_error!(
                        JsonErrorDetails::KeywordExpected(keyword),
                        cursor.position()
                    );
                }
            }
        }
        Ok(value)
    }

    /// Scan a string literal, translating escape sequences as they are found
    fn parse_string(&self, cursor: &mut Cursor) -> JsonResult<String> {
        cursor.advance();
        let mut buffer = String::new();
        loop {
            match cursor.advance() {
                None => {
                    return parser_error!(JsonErrorDetails::UnterminatedString, cursor.position());
                }
                Some(('"', _)) => return Ok(buffer),
                Some(('\\', _)) => self.parse_escape(cursor, &mut buffer)?,
                Some((c, coords)) if (c as u32) < 0x20 => {
                    return parser_error!(JsonErrorDetails::UnescapedControlCharacter(c), coords);
                }
                Some((c, _)) => buffer.push(c),
            }
        }
    }

    /// Translate a single escape sequence onto the end of the supplied buffer
    fn parse_escape(&self, cursor: &mut Cursor, buffer: &mut String) -> JsonResult<()> {
        match cursor.advance() {
            None => parser_error!(JsonErrorDetails::UnterminatedString, cursor.position()),
            Some(('"', _)) => {
                buffer.push('"');
                Ok(())
            }
            Some(('\\', _)) => {
                buffer.push('\\');
                Ok(())
            }
            Some(('/', _)) => {
                buffer.push('/');
                Ok(())
            }
            Some(('b', _)) => {
                buffer.push('\u{0008}');
                Ok(())
            }
            Some(('f', _)) => {
                buffer.push('\u{000c}');
                Ok(())
            }
            Some(('n', _)) => {
                buffer.push('\n');
                Ok(())
            }
            Some(('r', _)) => {
                buffer.push('\r');
                Ok(())
            }
            Some(('t', _)) => {
                buffer.push('\t');
                Ok(())
            }
            Some(('u', _)) => {
                buffer.push(self.parse_unicode_escape(cursor)?);
                Ok(())
            }
            Some((c, coords)) => parser_error!(JsonErrorDetails::InvalidEscapeSequence(c), coords),
        }
    }

    /// Scan the four hex digits of a `\uXXXX` escape. A high surrogate must be
    /// followed by a low surrogate escape; the pair is combined into a single
    /// scalar value before it reaches the string buffer
    fn parse_unicode_escape(&self, cursor: &mut Cursor) -> JsonResult<char> {
        let start = cursor.position();
        let code = self.parse_hex_digits(cursor)?;
        if (0xDC00..=0xDFFF).contains(&code) {
            return parser_error!(JsonErrorDetails::InvalidUnicodeEscapeSequence, start);
        }
        if (0xD800..=0xDBFF).contains(&code) {
            if cursor.lookahead(1) != Some('\\') || cursor.lookahead(2) != Some('u') {
                return parser_error!(JsonErrorDetails::InvalidUnicodeEscapeSequence, start);
            }
            cursor.advance();
            cursor.advance();
            let low_start = cursor.position();
            let low = self.parse_hex_digits(cursor)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return parser_error!(JsonErrorDetails::InvalidUnicodeEscapeSequence, low_start);
            }
            let scalar = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            return match std::char::from_u32(scalar) {
                Some(c) => Ok(c),
                None => parser_error!(JsonErrorDetails::InvalidUnicodeEscapeSequence, start),
            };
        }
        match std::char::from_u32(code) {
            Some(c) => Ok(c),
            None => parser_error!(JsonErrorDetails::InvalidUnicodeEscapeSequence, start),
        }
    }

    fn parse_hex_digits(&self, cursor: &mut Cursor) -> JsonResult<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            match cursor.advance() {
                Some((c, coords)) => match c.to_digit(16) {
                    Some(digit) => code = (code << 4) | digit,
                    None => {
                        return parser_error!(
                            JsonErrorDetails::InvalidUnicodeEscapeSequence,
                            coords
                        );
                    }
                },
                None => {
                    return parser_error!(JsonErrorDetails::UnterminatedString, cursor.position());
                }
            }
        }
        Ok(code)
    }

    /// Scan a number against the strict grammar, retaining the raw substring.
    /// The raw text is classified after scanning: integral representations are
    /// attempted first, falling through to a floating parse on overflow
    fn parse_number(&self, cursor: &mut Cursor) -> JsonResult<JsonValue> {
        let start = cursor.position();
        let mut raw = String::new();
        if let Some('-') = cursor.peek() {
            raw.push('-');
            cursor.advance();
        }
        match cursor.peek() {
            Some('0') => {
                raw.push('0');
                cursor.advance();
            }
            Some(c) if c.is_ascii_digit() => scan_digits(cursor, &mut raw),
            _ => {
                return parser_error!(
                    JsonErrorDetails::InvalidNumericRepresentation(raw),
                    cursor.position()
                );
            }
        }
        if let Some('.') = cursor.peek() {
            raw.push('.');
            cursor.advance();
            if !matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
                return parser_error!(
                    JsonErrorDetails::InvalidNumericRepresentation(raw),
                    cursor.position()
                );
            }
            scan_digits(cursor, &mut raw);
        }
        if matches!(cursor.peek(), Some('e' | 'E')) {
            if let Some((c, _)) = cursor.advance() {
                raw.push(c);
            }
            if matches!(cursor.peek(), Some('+' | '-')) {
                if let Some((c, _)) = cursor.advance() {
                    raw.push(c);
                }
            }
            if !matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
                return parser_error!(
                    JsonErrorDetails::InvalidNumericRepresentation(raw),
                    cursor.position()
                );
            }
            scan_digits(cursor, &mut raw);
        }
        if !raw.contains(&['.', 'e', 'E'][..]) {
            if let Some(value) = parse_integer(&raw) {
                let double = value as f64;
                return Ok(JsonValue::Number(JsonNumber::from_parts(
                    Some(value),
                    double,
                    raw,
                )));
            }
        }
        match fast_float::parse::<f64, _>(raw.as_bytes()) {
            Ok(value) if value.is_finite() => {
                Ok(JsonValue::Number(JsonNumber::from_parts(None, value, raw)))
            }
            _ => parser_error!(JsonErrorDetails::InvalidNumericRepresentation(raw), start),
        }
    }
}

fn scan_digits(cursor: &mut Cursor, raw: &mut String) {
    while let Some(c) = cursor.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        raw.push(c);
        cursor.advance();
    }
}

#[cfg(feature = "mixed_numerics")]
fn parse_integer(raw: &str) -> Option<i64> {
    lexical::parse::<i64, _>(raw.as_bytes()).ok()
}

#[cfg(not(feature = "mixed_numerics"))]
fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::dom::Parser;
    use crate::errors::JsonErrorDetails;
    use crate::relative_file;
    use crate::value::{JsonKind, JsonValue};

    #[test]
    fn should_parse_char_iterators_directly() {
        let source = r#"{
            "test" : 1232.0,
            "some other" : "thasdasd",
            "a bool" : true,
            "an array" : [1,2,3,4,5.8,6,7.2,7,8,10]
        }"#;
        let parser = Parser::default();
        let parsed = parser.parse(&mut source.chars());
        assert!(parsed.is_ok());
    }

    #[test]
    fn should_accept_any_value_at_the_root() {
        let parser = Parser::default();
        for source in ["null", "true", "false", "\"text\"", "12", "[]", "{}"] {
            assert!(parser.parse_str(source).is_ok(), "failed on {}", source);
        }
    }

    #[test]
    fn should_allow_surrounding_whitespace() {
        let parser = Parser::default();
        let parsed = parser.parse_str("  123  ").unwrap();
        let number = parsed.as_number().unwrap();
        assert!(number.is_integer());
        assert_eq!(number.as_i64().unwrap(), 123);
    }

    #[test]
    fn should_reject_trailing_content() {
        let parser = Parser::default();
        let err = parser.parse_str("123 456").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::TrailingCharacters);
        assert_eq!(err.coords.unwrap().absolute, 4);
    }

    #[test]
    fn should_classify_integral_numbers() {
        let parser = Parser::default();
        let parsed = parser.parse_str("42").unwrap();
        let number = parsed.as_number().unwrap();
        assert!(number.is_integer());
        assert_eq!(number.raw(), "42");
    }

    #[test]
    fn should_classify_floating_numbers() {
        let parser = Parser::default();
        for source in ["42.0", "1e10", "-0.25", "6.02E23"] {
            let parsed = parser.parse_str(source).unwrap();
            let number = parsed.as_number().unwrap();
            assert!(!number.is_integer(), "misclassified {}", source);
            assert_eq!(number.raw(), source);
        }
    }

    #[test]
    fn should_fall_through_to_floating_on_integer_overflow() {
        let parser = Parser::default();
        let parsed = parser.parse_str("9999999999999999999").unwrap();
        let number = parsed.as_number().unwrap();
        assert!(!number.is_integer());
        assert_eq!(number.raw(), "9999999999999999999");
        assert_eq!(number.as_f64(), 1e19);
    }

    #[test]
    fn should_reject_malformed_numbers() {
        let parser = Parser::default();
        for source in ["-", "1.", ".5", "1e", "1e+", "2.e1"] {
            assert!(parser.parse_str(source).is_err(), "accepted {}", source);
        }
    }

    #[test]
    fn should_reject_overflowing_exponents() {
        let parser = Parser::default();
        let err = parser.parse_str("1e999").unwrap_err();
        assert_eq!(
            err.details,
            JsonErrorDetails::InvalidNumericRepresentation("1e999".to_string())
        );
    }

    #[test]
    fn should_translate_standard_escapes() {
        let parser = Parser::default();
        let parsed = parser.parse_str(r#""a\nb\t\"c\"\\\/""#).unwrap();
        assert_eq!(parsed.as_str().unwrap(), "a\nb\t\"c\"\\/");
    }

    #[test]
    fn should_translate_unicode_escapes() {
        let parser = Parser::default();
        let parsed = parser.parse_str(r#""\u0041\u00e9\u2603""#).unwrap();
        assert_eq!(parsed.as_str().unwrap(), "Aé☃");
    }

    #[test]
    fn should_combine_surrogate_pairs_into_one_character() {
        let parser = Parser::default();
        let parsed = parser.parse_str(r#""\uD83D\uDE00""#).unwrap();
        let text = parsed.as_str().unwrap();
        assert_eq!(text, "😀");
        assert_eq!(text.chars().count(), 1);
    }

    #[test]
    fn should_reject_orphan_surrogates() {
        let parser = Parser::default();
        for source in [r#""\uD83D""#, r#""\uD83Dx""#, r#""\uDE00""#, r#""\uD83D\n""#] {
            let err = parser.parse_str(source).unwrap_err();
            assert_eq!(
                err.details,
                JsonErrorDetails::InvalidUnicodeEscapeSequence,
                "accepted {}",
                source
            );
        }
    }

    #[test]
    fn should_reject_invalid_escapes() {
        let parser = Parser::default();
        let err = parser.parse_str(r#""\x""#).unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::InvalidEscapeSequence('x'));
    }

    #[test]
    fn should_reject_unescaped_control_characters() {
        let parser = Parser::default();
        let err = parser.parse_str("\"a\u{0001}b\"").unwrap_err();
        assert_eq!(
            err.details,
            JsonErrorDetails::UnescapedControlCharacter('\u{0001}')
        );
    }

    #[test]
    fn should_reject_unterminated_strings() {
        let parser = Parser::default();
        let err = parser.parse_str("\"abc").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::UnterminatedString);
    }

    #[test]
    fn should_report_a_missing_value_at_the_closing_brace() {
        let parser = Parser::default();
        let err = parser.parse_str("{\"a\":}").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::UnexpectedCharacter('}'));
        assert_eq!(err.coords.unwrap().absolute, 5);
    }

    #[test]
    fn should_report_a_trailing_comma_at_the_closing_bracket() {
        let parser = Parser::default();
        let err = parser.parse_str("[1,]").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::UnexpectedCharacter(']'));
        assert_eq!(err.coords.unwrap().absolute, 3);
    }

    #[test]
    fn should_require_string_keys() {
        let parser = Parser::default();
        let err = parser.parse_str("{1: true}").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::KeyExpected);
        assert_eq!(err.coords.unwrap().absolute, 1);
    }

    #[test]
    fn should_require_a_colon_after_keys() {
        let parser = Parser::default();
        let err = parser.parse_str("{\"a\" true}").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::PairExpected);
    }

    #[test]
    fn should_require_separators_between_members() {
        let parser = Parser::default();
        let err = parser.parse_str("{\"a\": 1 \"b\": 2}").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::InvalidObject);
        let err = parser.parse_str("[1 2]").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::InvalidArray);
    }

    #[test]
    fn should_match_keywords_exactly() {
        let parser = Parser::default();
        for source in ["tru", "farse", "nul", "TRUE"] {
            assert!(parser.parse_str(source).is_err(), "accepted {}", source);
        }
    }

    #[test]
    fn should_collapse_duplicate_keys_last_write_wins() {
        let parser = Parser::default();
        let parsed = parser.parse_str("{\"a\": 1, \"a\": 2}").unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get_f64("a", 0.0), 2.0);
    }

    #[test]
    fn should_enforce_the_nesting_depth_limit() {
        let parser = Parser::with_max_depth(4);
        assert!(parser.parse_str("[[[[]]]]").is_ok());
        let err = parser.parse_str("[[[[[]]]]]").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::NestingTooDeep(4));
    }

    #[test]
    fn should_fail_on_empty_input() {
        let parser = Parser::default();
        let err = parser.parse_str("").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::EndOfInput);
    }

    #[test]
    fn should_parse_byte_slices_through_the_decoder() {
        let parser = Parser::default();
        let parsed = parser.parse_bytes("{\"snowman\": \"☃\"}".as_bytes()).unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.get_string("snowman", ""), "☃");
    }

    #[test]
    fn should_parse_config_documents_from_disk() {
        let path = relative_file!("tests/fixtures/json/valid/settings.json");
        let parser = Parser::default();
        let parsed = parser.parse_file(&path).unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.get_f64("window_width", 0.0), 600.0);
        assert_eq!(object.get_string("theme", ""), "dark");
    }

    #[test]
    fn should_report_missing_files() {
        let parser = Parser::default();
        let err = parser.parse_file("no/such/file.json").unwrap_err();
        assert_eq!(err.details, JsonErrorDetails::InvalidFile);
    }

    #[test]
    fn try_parse_should_never_raise() {
        let parser = Parser::default();
        let (value, error) = parser.try_parse_str("{\"a\": 1}");
        assert!(error.is_none());
        assert_eq!(value.kind(), JsonKind::Object);
        let (value, error) = parser.try_parse_str("{\"a\":}");
        assert_eq!(value, JsonValue::Null);
        let message = error.unwrap();
        assert!(message.contains("unexpected character"));
        assert!(message.contains("abs: 5"));
    }
}
