//! Reading raw JSON input through an explicit alias table.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{ValidationError, ValidationErrors, Violation, ViolationKind};

/// Bidirectional rename table between internal (snake_case) and external
/// (camelCase) field names of one request model.
#[derive(Debug)]
pub struct AliasTable {
    entries: &'static [(&'static str, &'static str)],
}

impl AliasTable {
    /// Entries are `(internal, external)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }

    /// External name for an internal field. Names not in the table pass through.
    pub fn external<'a>(&self, internal: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(i, _)| *i == internal)
            .map(|(_, e)| *e)
            .unwrap_or(internal)
    }

    /// Internal name for an input key given in either convention.
    pub fn internal(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(i, e)| *e == name || *i == name)
            .map(|(i, _)| *i)
    }
}

/// Field reader that records every violation it meets.
///
/// JSON `null` is treated as an absent field.
pub struct Fields<'a> {
    table: &'static AliasTable,
    values: BTreeMap<&'static str, &'a Value>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    /// Index `input` by internal name, rejecting unknown and repeated fields.
    pub fn read(input: &'a Value, table: &'static AliasTable) -> Self {
        let mut fields = Self {
            table,
            values: BTreeMap::new(),
            errors: ValidationErrors::new(),
        };

        let Some(object) = input.as_object() else {
            fields.errors.push(ValidationError {
                fields: vec!["body".to_string()],
                kind: ViolationKind::InvalidType,
                message: "expected a JSON object".to_string(),
            });
            return fields;
        };

        for (key, value) in object {
            let Some(internal) = table.internal(key) else {
                fields.errors.push(ValidationError {
                    fields: vec![key.clone()],
                    kind: ViolationKind::UnknownField,
                    message: "unknown field".to_string(),
                });
                continue;
            };
            if value.is_null() {
                continue;
            }
            if fields.values.insert(internal, value).is_some() {
                fields.error(
                    &[internal],
                    Violation::new(
                        ViolationKind::Conflict,
                        "given under both its external and internal name",
                    ),
                );
            }
        }

        fields
    }

    /// Raw value of a field, if present.
    pub fn raw(&self, internal: &str) -> Option<&'a Value> {
        self.values.get(internal).copied()
    }

    pub fn is_present(&self, internal: &str) -> bool {
        self.values.contains_key(internal)
    }

    /// Parse a field that may be absent.
    pub fn optional<T>(
        &mut self,
        internal: &str,
        parse: impl FnOnce(&'a Value) -> Result<T, Violation>,
    ) -> Option<T> {
        let value = self.raw(internal)?;
        self.check(&[internal], parse(value))
    }

    /// Parse a field that must be present.
    pub fn required<T>(
        &mut self,
        internal: &str,
        parse: impl FnOnce(&'a Value) -> Result<T, Violation>,
    ) -> Option<T> {
        if !self.is_present(internal) {
            self.error(
                &[internal],
                Violation::new(ViolationKind::Missing, "field required"),
            );
            return None;
        }
        self.optional(internal, parse)
    }

    /// Record the violation of `result`, if any, against `internals`.
    pub fn check<T>(&mut self, internals: &[&str], result: Result<T, Violation>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(violation) => {
                self.error(internals, violation);
                None
            }
        }
    }

    /// Record a violation against one or more fields.
    pub fn error(&mut self, internals: &[&str], violation: Violation) {
        self.errors.push(ValidationError {
            fields: internals
                .iter()
                .map(|f| self.table.external(f).to_string())
                .collect(),
            kind: violation.kind,
            message: violation.message,
        });
    }

    /// Finish reading: the built request when no rule was broken.
    pub fn finish<T>(self, built: Option<T>) -> Result<T, ValidationErrors> {
        let mut errors = self.errors;
        match built {
            Some(value) if errors.is_empty() => Ok(value),
            _ => {
                if errors.is_empty() {
                    errors.push(ValidationError {
                        fields: vec!["body".to_string()],
                        kind: ViolationKind::Missing,
                        message: "request is incomplete".to_string(),
                    });
                }
                Err(errors)
            }
        }
    }
}

/// Parsers from raw JSON values to primitive types.
pub mod parse {
    use serde_json::Value;

    use crate::validation::{Violation, ViolationKind};

    fn invalid_type(expected: &str) -> Violation {
        Violation::new(ViolationKind::InvalidType, format!("expected {}", expected))
    }

    pub fn string(value: &Value) -> Result<String, Violation> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid_type("a string"))
    }

    /// Non-blank string, trimmed.
    pub fn text(value: &Value) -> Result<String, Violation> {
        let s = string(value)?;
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Violation::new(ViolationKind::Empty, "must not be blank"));
        }
        Ok(trimmed.to_string())
    }

    pub fn integer(value: &Value) -> Result<i64, Violation> {
        value.as_i64().ok_or_else(|| invalid_type("an integer"))
    }

    pub fn positive_integer(value: &Value) -> Result<i64, Violation> {
        let n = integer(value)?;
        if n <= 0 {
            return Err(Violation::new(
                ViolationKind::InvalidValue,
                format!("must be positive, got {}", n),
            ));
        }
        Ok(n)
    }

    pub fn string_list(value: &Value) -> Result<Vec<String>, Violation> {
        let items = value
            .as_array()
            .ok_or_else(|| invalid_type("an array of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid_type("an array of strings"))
            })
            .collect()
    }

    pub fn integer_list(value: &Value) -> Result<Vec<i64>, Violation> {
        let items = value
            .as_array()
            .ok_or_else(|| invalid_type("an array of integers"))?;
        items
            .iter()
            .map(|item| item.as_i64().ok_or_else(|| invalid_type("an array of integers")))
            .collect()
    }
}
