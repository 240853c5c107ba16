//! The DOM value model
//!
//! A parsed document is a tree of [JsonValue]s. Every variant is constructed
//! either by the parser or programmatically through the constructors and
//! `From` conversions in this module; the tag of a value never changes after
//! construction, mutation replaces child values instead.
use std::fmt::{Display, Formatter};

use crate::errors::{JsonError, JsonErrorDetails, JsonErrorSource, JsonResult};
use crate::value_error;
use crate::writer;

/// Enumeration of the six different value kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Display for JsonKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
        }
    }
}

/// Basic enumeration of different Json values
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// Canonical null value
    Null,
    /// Canonical boolean value
    Boolean(bool),
    /// Numeric value, retaining the raw source text it was scanned from
    Number(JsonNumber),
    /// Canonical string value
    String(String),
    /// Ordered sequence of values
    Array(JsonArray),
    /// Mapping of (unique) string keys onto values
    Object(JsonObject),
}

impl JsonValue {
    /// The [JsonKind] tag for this value
    pub fn kind(&self) -> JsonKind {
        match self {
            Self::Null => JsonKind::Null,
            Self::Boolean(_) => JsonKind::Boolean,
            Self::Number(_) => JsonKind::Number,
            Self::String(_) => JsonKind::String,
            Self::Array(_) => JsonKind::Array,
            Self::Object(_) => JsonKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind() == JsonKind::Null
    }

    pub fn is_boolean(&self) -> bool {
        self.kind() == JsonKind::Boolean
    }

    pub fn is_number(&self) -> bool {
        self.kind() == JsonKind::Number
    }

    pub fn is_string(&self) -> bool {
        self.kind() == JsonKind::String
    }

    pub fn is_array(&self) -> bool {
        self.kind() == JsonKind::Array
    }

    pub fn is_object(&self) -> bool {
        self.kind() == JsonKind::Object
    }

    /// Convert into a boolean, failing with a type mismatch for any other tag
    pub fn as_boolean(&self) -> JsonResult<bool> {
        match self {
            Self::Boolean(value) => Ok(*value),
            other => mismatch(JsonKind::Boolean, other.kind()),
        }
    }

    /// Convert into a string slice, failing with a type mismatch for any other tag
    pub fn as_str(&self) -> JsonResult<&str> {
        match self {
            Self::String(value) => Ok(value),
            other => mismatch(JsonKind::String, other.kind()),
        }
    }

    /// Convert into a [JsonNumber], failing with a type mismatch for any other tag
    pub fn as_number(&self) -> JsonResult<&JsonNumber> {
        match self {
            Self::Number(value) => Ok(value),
            other => mismatch(JsonKind::Number, other.kind()),
        }
    }

    pub fn as_number_mut(&mut self) -> JsonResult<&mut JsonNumber> {
        match self {
            Self::Number(value) => Ok(value),
            other => mismatch(JsonKind::Number, other.kind()),
        }
    }

    /// Convert into an [JsonArray], failing with a type mismatch for any other tag
    pub fn as_array(&self) -> JsonResult<&JsonArray> {
        match self {
            Self::Array(value) => Ok(value),
            other => mismatch(JsonKind::Array, other.kind()),
        }
    }

    pub fn as_array_mut(&mut self) -> JsonResult<&mut JsonArray> {
        match self {
            Self::Array(value) => Ok(value),
            other => mismatch(JsonKind::Array, other.kind()),
        }
    }

    /// Convert into a [JsonObject], failing with a type mismatch for any other tag
    pub fn as_object(&self) -> JsonResult<&JsonObject> {
        match self {
            Self::Object(value) => Ok(value),
            other => mismatch(JsonKind::Object, other.kind()),
        }
    }

    pub fn as_object_mut(&mut self) -> JsonResult<&mut JsonObject> {
        match self {
            Self::Object(value) => Ok(value),
            other => mismatch(JsonKind::Object, other.kind()),
        }
    }
}

fn mismatch<T>(expected: JsonKind, actual: JsonKind) -> JsonResult<T> {
    value_error!(JsonErrorDetails::TypeMismatch { expected, actual })
}

impl Default for JsonValue {
    fn default() -> Self {
        Self::Null
    }
}

impl Display for JsonValue {
    /// Renders the compact form of the value
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", writer::to_string(self))
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        Self::Number(JsonNumber::from_i64(value))
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<JsonNumber> for JsonValue {
    fn from(value: JsonNumber) -> Self {
        Self::Number(value)
    }
}

impl From<JsonArray> for JsonValue {
    fn from(value: JsonArray) -> Self {
        Self::Array(value)
    }
}

impl From<JsonObject> for JsonValue {
    fn from(value: JsonObject) -> Self {
        Self::Object(value)
    }
}

/// A numeric value, distinguishing integral from floating magnitudes whilst
/// retaining the exact source text it was scanned from.
///
/// The raw text is emitted verbatim on serialization, which preserves
/// exponent case, trailing zeros and sign formatting exactly as parsed. The
/// mutators regenerate the raw text from the new magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonNumber {
    /// The integral value, when the number is representable as an `i64`
    /// without loss
    integer: Option<i64>,
    /// Best-effort floating companion representation, always computed
    double: f64,
    /// The exact source substring this number was scanned from
    raw: String,
}

impl JsonNumber {
    /// Construct an integral number, rendering the canonical decimal form
    pub fn from_i64(value: i64) -> Self {
        JsonNumber {
            integer: Some(value),
            double: value as f64,
            raw: value.to_string(),
        }
    }

    /// Construct a floating number, rendering the canonical decimal form.
    /// Non-finite magnitudes have no JSON representation and are rejected
    pub fn from_f64(value: f64) -> JsonResult<Self> {
        if !value.is_finite() {
            return value_error!(JsonErrorDetails::InvalidNumericRepresentation(
                value.to_string()
            ));
        }
        Ok(JsonNumber {
            integer: None,
            double: value,
            raw: render_f64(value),
        })
    }

    /// Construct a number directly from its parsed parts. The raw text must
    /// be the exact source substring the magnitude was scanned from
    pub(crate) fn from_parts(integer: Option<i64>, double: f64, raw: String) -> Self {
        JsonNumber {
            integer,
            double,
            raw,
        }
    }

    /// Whether the number is representable as an `i64` without loss
    pub fn is_integer(&self) -> bool {
        self.integer.is_some()
    }

    /// The integral value. Fails with a range error when the magnitude lies
    /// outside the 64-bit integer range, or is not integral
    pub fn as_i64(&self) -> JsonResult<i64> {
        if let Some(value) = self.integer {
            return Ok(value);
        }
        if self.double < i64::MIN as f64 || self.double > i64::MAX as f64 {
            return value_error!(JsonErrorDetails::IntegerOutOfRange(self.double));
        }
        if self.double.fract() != 0.0 {
            return value_error!(JsonErrorDetails::NonIntegralNumber(self.double));
        }
        Ok(self.double as i64)
    }

    /// The floating companion representation
    pub fn as_f64(&self) -> f64 {
        self.double
    }

    /// The exact source text this number was scanned from
    pub fn raw(&self) -> &str {
        self.raw.as_str()
    }

    /// Overwrite the magnitude with an integral value, regenerating the raw text
    pub fn set_i64(&mut self, value: i64) {
        *self = Self::from_i64(value);
    }

    /// Overwrite the magnitude with a floating value, regenerating the raw
    /// text. Non-finite magnitudes are rejected
    pub fn set_f64(&mut self, value: f64) -> JsonResult<()> {
        *self = Self::from_f64(value)?;
        Ok(())
    }
}

/// Render a floating magnitude, ensuring the result reparses as non-integral
fn render_f64(value: f64) -> String {
    let mut rendered = value.to_string();
    if !rendered.contains(&['.', 'e', 'E'][..]) {
        rendered.push_str(".0");
    }
    rendered
}

/// An ordered sequence of values, indexable by position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonArray {
    items: Vec<JsonValue>,
}

impl JsonArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JsonValue> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut JsonValue> {
        self.items.get_mut(index)
    }

    /// Append a value to the end of the array
    pub fn push(&mut self, value: impl Into<JsonValue>) {
        self.items.push(value.into());
    }

    /// Replace the value at a given position. Fails with an index error when
    /// the position is out of bounds
    pub fn set(&mut self, index: usize, value: impl Into<JsonValue>) -> JsonResult<()> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => value_error!(JsonErrorDetails::IndexOutOfBounds { index, len }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonValue> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a JsonArray {
    type Item = &'a JsonValue;
    type IntoIter = std::slice::Iter<'a, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<JsonValue> for JsonArray {
    fn from_iter<T: IntoIterator<Item = JsonValue>>(iter: T) -> Self {
        JsonArray {
            items: iter.into_iter().collect(),
        }
    }
}

/// A mapping of unique string keys onto values, preserving insertion order
/// so that serialized output is deterministic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject {
    members: Vec<(String, JsonValue)>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.members.iter().any(|(k, _)| k == key)
    }

    /// Strict lookup; absence is reported as [None] rather than an error
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.members
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        self.members
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a value under a key. An existing key keeps its position and
    /// has its value replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        let key = key.into();
        let value = value.into();
        match self.members.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.members.push((key, value)),
        }
    }

    /// Read a string member, substituting the default when the key is absent
    /// or the stored value is not a string
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(JsonValue::String(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    /// Read a boolean member, substituting the default when the key is absent
    /// or the stored value is not a boolean
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(JsonValue::Boolean(value)) => *value,
            _ => default,
        }
    }

    /// Read a numeric member as a double, substituting the default when the
    /// key is absent or the stored value is not a number
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(JsonValue::Number(value)) => value.as_f64(),
            _ => default,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a JsonObject {
    type Item = &'a (String, JsonValue);
    type IntoIter = std::slice::Iter<'a, (String, JsonValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
