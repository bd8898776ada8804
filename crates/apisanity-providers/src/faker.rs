// crates/apisanity-providers/src/faker.rs
// ============================================================================
// Module: Fake Data Generator
// Description: Random instance generation for JSON schemas.
// Purpose: Supply request bodies and inverted-type values for test cases.
// Dependencies: apisanity-core, rand, serde, serde_json
// ============================================================================

//! ## Overview
//! [`RandomFakeGenerator`] walks a schema and produces a random instance that
//! satisfies the common keywords: `type`, `enum`, `const`, `allOf`, `anyOf`,
//! `oneOf`, string formats, numeric bounds, array bounds, and object
//! properties. A fixed seed makes output reproducible across runs.
//! Keywords outside that set (such as `pattern`) are ignored, so a generated
//! value is a best-effort instance rather than a guaranteed one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use apisanity_core::FakeGenerator;
use apisanity_core::GeneratorError;
use rand::Rng;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default upper bound for generated integers.
const DEFAULT_INTEGER_SPAN: i64 = 1_000;

/// Default width of generated number ranges with a missing bound.
const DEFAULT_NUMBER_SPAN: f64 = 1_000.0;

/// Default maximum length for generated strings.
const DEFAULT_MAX_STRING_LENGTH: usize = 12;

/// Options passed through to the fake data generator.
///
/// # Invariants
/// - `min_items <= max_items`.
/// - Schemas nested deeper than `max_depth` collapse to empty containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Optional RNG seed for reproducible output.
    pub seed: Option<u64>,
    /// Default minimum array length when a schema sets none.
    pub min_items: usize,
    /// Default maximum array length when a schema sets none.
    pub max_items: usize,
    /// Emit optional object properties as well as required ones.
    pub always_fake_optionals: bool,
    /// Prefer a schema's `example` over random generation.
    pub use_examples: bool,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            seed: None,
            min_items: 1,
            max_items: 3,
            always_fake_optionals: true,
            use_examples: false,
            max_depth: 8,
        }
    }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Random schema instance generator.
///
/// # Invariants
/// - The RNG is shared behind a mutex, so concurrent calls serialize.
pub struct RandomFakeGenerator {
    /// Generator options.
    options: GeneratorOptions,
    /// Random source.
    rng: Mutex<StdRng>,
}

impl RandomFakeGenerator {
    /// Creates a generator, seeded from `options.seed` when present.
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        let rng = options.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            options,
            rng: Mutex::new(rng),
        }
    }

    /// Returns the generator options.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }
}

impl Default for RandomFakeGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl FakeGenerator for RandomFakeGenerator {
    fn generate(&self, schema: &Value) -> Result<Value, GeneratorError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| GeneratorError::Internal("generator rng poisoned".to_string()))?;
        let mut faker = Faker {
            options: &self.options,
            rng: &mut *rng,
        };
        faker.fake(schema, 0)
    }
}

// ============================================================================
// SECTION: Schema Walk
// ============================================================================

/// Single generation pass over one schema.
struct Faker<'a> {
    /// Generator options.
    options: &'a GeneratorOptions,
    /// Locked random source.
    rng: &'a mut StdRng,
}

impl Faker<'_> {
    /// Generates an instance of `schema` at nesting `depth`.
    fn fake(&mut self, schema: &Value, depth: usize) -> Result<Value, GeneratorError> {
        let Some(map) = schema.as_object() else {
            return match schema {
                Value::Bool(false) => {
                    Err(GeneratorError::Unsupported("false schema has no instances".to_string()))
                }
                _ => Ok(Value::Object(Map::new())),
            };
        };
        if self.options.use_examples
            && let Some(example) = map.get("example")
        {
            return Ok(example.clone());
        }
        if let Some(constant) = map.get("const") {
            return Ok(constant.clone());
        }
        if let Some(choices) = map.get("enum").and_then(Value::as_array)
            && !choices.is_empty()
        {
            let index = self.rng.gen_range(0 .. choices.len());
            return Ok(choices[index].clone());
        }
        if let Some(parts) = map.get("allOf").and_then(Value::as_array) {
            let merged = merge_all_of(map, parts);
            return self.fake(&merged, depth);
        }
        for keyword in ["oneOf", "anyOf"] {
            if let Some(options) = map.get(keyword).and_then(Value::as_array)
                && !options.is_empty()
            {
                let index = self.rng.gen_range(0 .. options.len());
                return self.fake(&options[index], depth);
            }
        }
        match schema_type(map).as_deref() {
            Some("string") => Ok(Value::String(self.fake_string(map)?)),
            Some("integer") => self.fake_integer(map),
            Some("number") => self.fake_number(map),
            Some("boolean") => Ok(Value::Bool(self.rng.gen_bool(0.5))),
            Some("null") => Ok(Value::Null),
            Some("array") => self.fake_array(map, depth),
            Some("object") | None => self.fake_object(map, depth),
            Some(other) => Err(GeneratorError::Unsupported(format!("schema type {other}"))),
        }
    }

    /// Generates a string honoring `format` and length bounds.
    fn fake_string(&mut self, map: &Map<String, Value>) -> Result<String, GeneratorError> {
        if let Some(format) = map.get("format").and_then(Value::as_str)
            && let Some(value) = self.fake_format(format)
        {
            return Ok(value);
        }
        let min = read_usize(map, "minLength")
            .unwrap_or_else(|| read_usize(map, "maxLength").map_or(1, |max| max.min(1)));
        let max = read_usize(map, "maxLength")
            .unwrap_or_else(|| min.max(DEFAULT_MAX_STRING_LENGTH));
        if min > max {
            return Err(GeneratorError::Unsupported(format!(
                "string length range {min}..={max} is empty"
            )));
        }
        let length = self.rng.gen_range(min ..= max);
        Ok(self.word(length))
    }

    /// Generates a value for a known string format.
    fn fake_format(&mut self, format: &str) -> Option<String> {
        let value = match format {
            "date-time" => {
                let date = self.date();
                format!(
                    "{date}T{:02}:{:02}:{:02}Z",
                    self.rng.gen_range(0 .. 24),
                    self.rng.gen_range(0 .. 60),
                    self.rng.gen_range(0 .. 60)
                )
            }
            "date" => self.date(),
            "email" => format!("{}@example.com", self.word(8)),
            "hostname" => format!("{}.example.com", self.word(8)),
            "uri" | "url" => format!("https://example.com/{}", self.word(8)),
            "ipv4" => format!(
                "{}.{}.{}.{}",
                self.rng.gen_range(1 ..= 223),
                self.rng.gen_range(0 ..= 255),
                self.rng.gen_range(0 ..= 255),
                self.rng.gen_range(1 ..= 254)
            ),
            "uuid" => {
                let high = self.rng.next_u64();
                let low = self.rng.next_u64();
                format!(
                    "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
                    high >> 32,
                    (high >> 16) & 0xffff,
                    high & 0x0fff,
                    ((low >> 48) & 0x3fff) | 0x8000,
                    low & 0xffff_ffff_ffff
                )
            }
            _ => return None,
        };
        Some(value)
    }

    /// Generates a calendar date in `YYYY-MM-DD` form.
    fn date(&mut self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.rng.gen_range(2000 ..= 2030),
            self.rng.gen_range(1 ..= 12),
            self.rng.gen_range(1 ..= 28)
        )
    }

    /// Generates a lowercase word of `length` letters.
    fn word(&mut self, length: usize) -> String {
        (0 .. length).map(|_| char::from(self.rng.gen_range(b'a' ..= b'z'))).collect()
    }

    /// Generates an integer within the schema bounds.
    ///
    /// A missing lower bound defaults to zero, or to one span below a negative
    /// upper bound.
    fn fake_integer(&mut self, map: &Map<String, Value>) -> Result<Value, GeneratorError> {
        let lower = integer_bound(map, "minimum", "exclusiveMinimum", Bound::Lower);
        let upper = integer_bound(map, "maximum", "exclusiveMaximum", Bound::Upper);
        let (min, max) = match (lower, upper) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, min.saturating_add(DEFAULT_INTEGER_SPAN)),
            (None, Some(max)) if max >= 0 => (0, max),
            (None, Some(max)) => (max.saturating_sub(DEFAULT_INTEGER_SPAN), max),
            (None, None) => (0, DEFAULT_INTEGER_SPAN),
        };
        if min > max {
            return Err(GeneratorError::Unsupported(format!(
                "integer range {min}..={max} is empty"
            )));
        }
        Ok(Value::from(self.rng.gen_range(min ..= max)))
    }

    /// Generates a number within the schema bounds.
    fn fake_number(&mut self, map: &Map<String, Value>) -> Result<Value, GeneratorError> {
        let (lower, lower_exclusive) =
            number_bound(map, "minimum", "exclusiveMinimum", Bound::Lower);
        let (upper, upper_exclusive) =
            number_bound(map, "maximum", "exclusiveMaximum", Bound::Upper);
        let span = DEFAULT_NUMBER_SPAN;
        let (min, max) = match (lower, upper) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, min + span),
            (None, Some(max)) if max > 0.0 => (0.0, max),
            (None, Some(max)) => (max - span, max),
            (None, None) => (0.0, span),
        };
        let empty = if lower_exclusive || upper_exclusive { min >= max } else { min > max };
        if empty || !min.is_finite() || !max.is_finite() {
            return Err(GeneratorError::Unsupported(format!(
                "number range {min}..{max} is empty"
            )));
        }
        let mut value = if upper_exclusive {
            self.rng.gen_range(min .. max)
        } else {
            self.rng.gen_range(min ..= max)
        };
        if lower_exclusive && value <= min {
            value = min + (max - min) / 2.0;
        }
        Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| GeneratorError::Internal("generated a non-finite number".to_string()))
    }

    /// Generates an array honoring item bounds.
    fn fake_array(
        &mut self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Value, GeneratorError> {
        if depth >= self.options.max_depth {
            return Ok(Value::Array(Vec::new()));
        }
        let min = read_usize(map, "minItems").unwrap_or(self.options.min_items);
        let max = read_usize(map, "maxItems").unwrap_or_else(|| self.options.max_items.max(min));
        if min > max {
            return Err(GeneratorError::Unsupported(format!(
                "array length range {min}..={max} is empty"
            )));
        }
        let length = self.rng.gen_range(min ..= max);
        let empty = Value::Object(Map::new());
        let items = match map.get("items") {
            Some(Value::Array(tuple)) => {
                return tuple
                    .iter()
                    .map(|item| self.fake(item, depth + 1))
                    .collect::<Result<_, _>>()
                    .map(Value::Array);
            }
            Some(items) => items,
            None => &empty,
        };
        (0 .. length)
            .map(|_| self.fake(items, depth + 1))
            .collect::<Result<_, _>>()
            .map(Value::Array)
    }

    /// Generates an object from `properties`.
    fn fake_object(
        &mut self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Value, GeneratorError> {
        let mut out = Map::new();
        if depth >= self.options.max_depth {
            return Ok(Value::Object(out));
        }
        let Some(properties) = map.get("properties").and_then(Value::as_object) else {
            return Ok(Value::Object(out));
        };
        let required: Vec<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        for (name, child) in properties {
            let include = self.options.always_fake_optionals
                || required.contains(&name.as_str())
                || self.rng.gen_bool(0.5);
            if include {
                out.insert(name.clone(), self.fake(child, depth + 1)?);
            }
        }
        Ok(Value::Object(out))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the effective type name, preferring the first non-null entry.
fn schema_type(map: &Map<String, Value>) -> Option<String> {
    match map.get("type") {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            names
                .iter()
                .find(|name| **name != "null")
                .or_else(|| names.first())
                .map(|name| (*name).to_string())
        }
        _ if map.contains_key("properties") => Some("object".to_string()),
        _ if map.contains_key("items") => Some("array".to_string()),
        _ => None,
    }
}

/// Reads a non-negative integer keyword as `usize`.
fn read_usize(map: &Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key).and_then(Value::as_u64).and_then(|value| usize::try_from(value).ok())
}

/// Side of a numeric range.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Bound {
    /// `minimum` / `exclusiveMinimum`.
    Lower,
    /// `maximum` / `exclusiveMaximum`.
    Upper,
}

/// Returns the tightest inclusive integer bound.
///
/// Accepts the boolean (draft 4) and numeric (draft 6+) exclusive forms.
fn integer_bound(
    map: &Map<String, Value>,
    inclusive_key: &str,
    exclusive_key: &str,
    side: Bound,
) -> Option<i64> {
    let step = match side {
        Bound::Lower => 1,
        Bound::Upper => -1,
    };
    let inclusive = map.get(inclusive_key).and_then(Value::as_i64);
    let exclusive = match map.get(exclusive_key) {
        Some(Value::Bool(true)) => inclusive,
        Some(value) => value.as_i64(),
        None => None,
    }
    .map(|bound| bound.saturating_add(step));
    match (inclusive, exclusive, side) {
        (Some(a), Some(b), Bound::Lower) => Some(a.max(b)),
        (Some(a), Some(b), Bound::Upper) => Some(a.min(b)),
        (a, b, _) => a.or(b),
    }
}

/// Returns the tightest numeric bound and whether it excludes itself.
fn number_bound(
    map: &Map<String, Value>,
    inclusive_key: &str,
    exclusive_key: &str,
    side: Bound,
) -> (Option<f64>, bool) {
    let inclusive = map.get(inclusive_key).and_then(Value::as_f64);
    let exclusive = match map.get(exclusive_key) {
        Some(Value::Bool(true)) => return (inclusive, inclusive.is_some()),
        Some(value) => value.as_f64(),
        None => None,
    };
    match (inclusive, exclusive) {
        (Some(bound), Some(excluded)) => {
            let tighter = match side {
                Bound::Lower => excluded >= bound,
                Bound::Upper => excluded <= bound,
            };
            if tighter { (Some(excluded), true) } else { (Some(bound), false) }
        }
        (None, Some(excluded)) => (Some(excluded), true),
        (bound, None) => (bound, false),
    }
}

/// Merges `allOf` members into a single schema.
fn merge_all_of(base: &Map<String, Value>, parts: &[Value]) -> Value {
    let mut merged = base.clone();
    merged.remove("allOf");
    let mut properties = merged
        .remove("properties")
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default();
    let mut required: Vec<Value> = merged
        .remove("required")
        .and_then(|value| value.as_array().cloned())
        .unwrap_or_default();
    for part in parts.iter().filter_map(Value::as_object) {
        for (key, value) in part {
            match key.as_str() {
                "properties" => {
                    if let Some(members) = value.as_object() {
                        properties.extend(members.clone());
                    }
                }
                "required" => {
                    for name in value.as_array().into_iter().flatten() {
                        if !required.contains(name) {
                            required.push(name.clone());
                        }
                    }
                }
                _ => {
                    merged.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }
    }
    if !properties.is_empty() {
        merged.insert("properties".to_string(), Value::Object(properties));
    }
    if !required.is_empty() {
        merged.insert("required".to_string(), Value::Array(required));
    }
    Value::Object(merged)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use serde_json::json;

    use super::*;

    fn seeded() -> RandomFakeGenerator {
        RandomFakeGenerator::new(GeneratorOptions {
            seed: Some(7),
            ..GeneratorOptions::default()
        })
    }

    #[test]
    fn same_seed_produces_same_values() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
        });
        assert_eq!(seeded().generate(&schema).unwrap(), seeded().generate(&schema).unwrap());
    }

    #[test]
    fn integer_bounds_are_respected() {
        let generator = seeded();
        let schema =
            json!({"type": "integer", "minimum": 5, "maximum": 10, "exclusiveMaximum": true});
        for _ in 0 .. 50 {
            let value = generator.generate(&schema).unwrap().as_i64().unwrap();
            assert!((5 .. 10).contains(&value));
        }
    }

    #[test]
    fn negative_upper_bound_without_minimum_is_satisfiable() {
        let generator = seeded();
        let integer = json!({"type": "integer", "maximum": -10});
        let number = json!({"type": "number", "maximum": -0.5});
        for _ in 0 .. 50 {
            let value = generator.generate(&integer).unwrap().as_i64().unwrap();
            assert!((-1_010 ..= -10).contains(&value));
            let value = generator.generate(&number).unwrap().as_f64().unwrap();
            assert!(value <= -0.5);
        }
        let only_exclusive = json!({"type": "integer", "exclusiveMaximum": -3});
        let value = generator.generate(&only_exclusive).unwrap().as_i64().unwrap();
        assert!(value <= -4);
    }

    #[test]
    fn number_exclusive_bounds_are_never_returned() {
        let generator = seeded();
        let boolean_form = json!({
            "type": "number",
            "minimum": 1.0,
            "maximum": 1.000_000_1,
            "exclusiveMinimum": true,
            "exclusiveMaximum": true
        });
        let numeric_form =
            json!({"type": "number", "exclusiveMinimum": 2.0, "maximum": 2.000_000_1});
        for _ in 0 .. 50 {
            let value = generator.generate(&boolean_form).unwrap().as_f64().unwrap();
            assert!(value > 1.0 && value < 1.000_000_1);
            let value = generator.generate(&numeric_form).unwrap().as_f64().unwrap();
            assert!(value > 2.0 && value <= 2.000_000_1);
        }
        let closed = json!({"type": "number", "minimum": 3.0, "exclusiveMaximum": 3.0});
        assert!(generator.generate(&closed).is_err());
    }

    #[test]
    fn all_of_members_are_merged() {
        let schema = json!({
            "allOf": [
                {"type": "object", "properties": {"id": {"type": "integer"}}, "required": ["id"]},
                {"properties": {"label": {"type": "string"}}}
            ]
        });
        let value = seeded().generate(&schema).unwrap();
        assert!(value["id"].is_i64());
        assert!(value["label"].is_string());
    }

    #[test]
    fn enum_and_format_values_are_used() {
        let generator = seeded();
        let picked = generator.generate(&json!({"enum": ["a", "b"]})).unwrap();
        assert!(picked == json!("a") || picked == json!("b"));
        let uuid = generator.generate(&json!({"type": "string", "format": "uuid"})).unwrap();
        assert_eq!(uuid.as_str().unwrap().len(), 36);
    }

    #[test]
    fn plain_strings_are_lowercase_words() {
        let generator = seeded();
        for _ in 0 .. 20 {
            let value = generator.generate(&json!({"type": "string"})).unwrap();
            let text = value.as_str().unwrap();
            assert!(!text.is_empty());
            assert!(text.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = seeded().generate(&json!({"type": "file"})).unwrap_err();
        assert!(matches!(err, GeneratorError::Unsupported(_)));
    }

    #[test]
    fn depth_limit_collapses_containers() {
        let generator = RandomFakeGenerator::new(GeneratorOptions {
            seed: Some(1),
            max_depth: 1,
            ..GeneratorOptions::default()
        });
        let schema = json!({
            "type": "object",
            "properties": {"inner": {"type": "object", "properties": {"x": {"type": "string"}}}}
        });
        assert_eq!(generator.generate(&schema).unwrap(), json!({"inner": {}}));
    }
}
