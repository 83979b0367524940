//! Summary validation with a repair step for known malformations.
//!
//! A candidate is any JSON value. Before any check runs, each registered
//! [`RepairPass`] may rewrite it; the only built-in pass is
//! [`FlattenNested`], which undoes an upstream habit of serializing the whole
//! working object into one nested field. The checks themselves are:
//!
//! 1. the candidate is an object ([`ValidationError::TypeMismatch`]);
//! 2. `tldr`, `ideas` and `insights` are present ([`ValidationError::MissingFields`]);
//! 3. `tldr` is a non-empty string, `ideas`/`insights` are arrays of the
//!    expected item shape ([`ValidationError::InvalidField`]).
//!
//! Optional fields are not checked; a wrong shape reads as absent. On
//! success the source id is force-set and list caps are applied.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ValidationError;
use crate::lexicon::{REPAIR_METADATA_FIELDS, REQUIRED_FIELDS};
use crate::summary::{Idea, StructuredSummary};

/// A rewrite applied to a candidate object before validation.
pub trait RepairPass {
    /// Stable name reported when the pass fires.
    fn name(&self) -> &'static str;

    /// Returns the candidate, possibly rewritten, and whether anything changed.
    fn repair(&self, candidate: Map<String, Value>) -> (Map<String, Value>, bool);
}

/// Flattens a nested object that carries any required summary field.
///
/// The nested object's keys are merged over the outer keys listed in
/// [`REPAIR_METADATA_FIELDS`]; all other outer keys are discarded and inner
/// values win on conflict. A nested `summary` key is preferred, otherwise
/// the first qualifying key in map order is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenNested;

impl FlattenNested {
    fn carries_required(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|inner| REQUIRED_FIELDS.iter().any(|field| inner.contains_key(*field)))
    }
}

impl RepairPass for FlattenNested {
    fn name(&self) -> &'static str {
        "flatten-nested"
    }

    fn repair(&self, mut candidate: Map<String, Value>) -> (Map<String, Value>, bool) {
        let key = if candidate.get("summary").is_some_and(Self::carries_required) {
            Some("summary".to_string())
        } else {
            candidate
                .iter()
                .find(|(_, value)| Self::carries_required(value))
                .map(|(key, _)| key.clone())
        };

        let Some(key) = key else {
            return (candidate, false);
        };
        let Some(Value::Object(inner)) = candidate.remove(&key) else {
            return (candidate, false);
        };

        let mut flattened: Map<String, Value> = candidate
            .into_iter()
            .filter(|(k, _)| REPAIR_METADATA_FIELDS.contains(&k.as_str()))
            .collect();
        flattened.extend(inner);

        (flattened, true)
    }
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub summary: StructuredSummary,
    /// Names of the repair passes that fired, in order.
    pub repairs: Vec<&'static str>,
}

impl Validation {
    pub fn was_repaired(&self) -> bool {
        !self.repairs.is_empty()
    }
}

/// Validator holding an ordered list of repair passes.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tldw_core::Validator;
///
/// let candidate = json!({"status": "ok", "summary": {"tldr": "x", "ideas": [], "insights": []}});
/// let report = Validator::new().validate(candidate, "abc").unwrap();
/// assert!(report.was_repaired());
/// assert_eq!(report.summary.tldr, "x");
/// ```
pub struct Validator {
    repairs: Vec<Box<dyn RepairPass + Send + Sync>>,
}

impl Validator {
    /// Creates a validator with the built-in repair passes.
    pub fn new() -> Self {
        Self { repairs: vec![Box::new(FlattenNested)] }
    }

    /// Creates a validator with no repair passes.
    pub fn strict() -> Self {
        Self { repairs: Vec::new() }
    }

    /// Appends a repair pass; passes run in registration order.
    pub fn with_repair(mut self, pass: impl RepairPass + Send + Sync + 'static) -> Self {
        self.repairs.push(Box::new(pass));
        self
    }

    /// Repairs and validates `candidate`, stamping `source_id` on the result.
    pub fn validate(&self, candidate: Value, source_id: &str) -> Result<Validation, ValidationError> {
        let mut map = match candidate {
            Value::Object(map) => map,
            other => return Err(ValidationError::TypeMismatch { found: json_type_name(&other) }),
        };

        let mut repairs = Vec::new();
        for pass in &self.repairs {
            let (repaired, fired) = pass.repair(map);
            map = repaired;
            if fired {
                warn!(source_id, repair = pass.name(), "repaired malformed summary structure");
                repairs.push(pass.name());
            }
        }

        let missing: Vec<&'static str> =
            REQUIRED_FIELDS.iter().copied().filter(|field| !map.contains_key(*field)).collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        match map.get("tldr") {
            Some(Value::String(tldr)) if !tldr.trim().is_empty() => {}
            _ => return Err(invalid("tldr", "must be a non-empty string")),
        }

        let ideas = map.get("ideas").cloned().unwrap_or(Value::Null);
        if !ideas.is_array() {
            return Err(invalid("ideas", "must be a list"));
        }
        serde_json::from_value::<Vec<Idea>>(ideas)
            .map_err(|e| invalid("ideas", &format!("items must be strings or {{text, timestamp}} objects: {}", e)))?;

        let insights = map.get("insights").cloned().unwrap_or(Value::Null);
        if !insights.is_array() {
            return Err(invalid("insights", "must be a list"));
        }
        serde_json::from_value::<Vec<String>>(insights)
            .map_err(|e| invalid("insights", &format!("items must be strings: {}", e)))?;

        map.remove("sourceId");
        map.insert("videoId".to_string(), Value::String(source_id.to_string()));

        let mut summary: StructuredSummary =
            serde_json::from_value(Value::Object(map)).map_err(|e| invalid("summary", &e.to_string()))?;
        summary.enforce_caps();

        Ok(Validation { summary, repairs })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates a candidate with the built-in repair passes.
pub fn validate(candidate: Value, source_id: &str) -> Result<StructuredSummary, ValidationError> {
    Validator::new().validate(candidate, source_id).map(|v| v.summary)
}

fn invalid(field: &'static str, reason: &str) -> ValidationError {
    ValidationError::InvalidField { field, reason: reason.to_string() }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
