// In-process evaluation of `Query` over a dataset export.
//
// Loads the JSON array or NDJSON produced by a dataset export and answers
// the same structured queries the HTTP store does, including reference
// expansion. Draft documents (`drafts.` ids) are not visible, matching the
// public API.

use crate::core::query::{Direction, Field, Predicate, Query, Selection, Slice};
use crate::domain::ports::ContentStore;
use crate::utils::error::{ContentError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub struct MemoryStore {
    documents: Vec<Value>,
    by_id: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Value>) -> Self {
        let documents: Vec<Value> = documents
            .into_iter()
            .filter(|doc| {
                doc.get("_id")
                    .and_then(Value::as_str)
                    .is_some_and(|id| !id.starts_with("drafts."))
            })
            .collect();

        let by_id = documents
            .iter()
            .enumerate()
            .filter_map(|(index, doc)| {
                doc.get("_id")
                    .and_then(Value::as_str)
                    .map(|id| (id.to_string(), index))
            })
            .collect();

        Self { documents, by_id }
    }

    /// Accepts either a JSON array of documents or one document per line.
    pub fn from_export_str(content: &str) -> Result<Self> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('[') {
            let documents: Vec<Value> = serde_json::from_str(trimmed)?;
            return Ok(Self::new(documents));
        }

        let mut documents = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let document = serde_json::from_str(line).map_err(|e| ContentError::ConfigError {
                message: format!("export line {}: {}", line_no + 1, e),
            })?;
            documents.push(document);
        }
        Ok(Self::new(documents))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let store = Self::from_export_str(&content)?;
        tracing::info!(
            "Loaded {} documents from {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn get(&self, id: &str) -> Option<&Value> {
        self.by_id.get(id).map(|index| &self.documents[*index])
    }

    pub fn evaluate(&self, query: &Query) -> Value {
        let mut matched: Vec<&Value> = self
            .documents
            .iter()
            .filter(|doc| doc.get("_type").and_then(Value::as_str) == Some(query.entity.as_str()))
            .filter(|doc| {
                query
                    .predicates
                    .iter()
                    .all(|predicate| holds(doc, predicate, &query.params))
            })
            .collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let ordering = compare_values(lookup(a, order.field), lookup(b, order.field));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        match &query.selection {
            Selection::Pluck { field, unique } => {
                let mut values: Vec<Value> = Vec::new();
                for value in matched.iter().filter_map(|doc| lookup(doc, field)) {
                    if value.is_null() || (*unique && values.contains(value)) {
                        continue;
                    }
                    values.push(value.clone());
                }
                Value::Array(values)
            }
            Selection::Project(fields) => {
                let mut projected = matched.into_iter().map(|doc| self.project(doc, fields));
                match query.slice {
                    Slice::First => projected.next().unwrap_or(Value::Null),
                    Slice::All => Value::Array(projected.collect()),
                }
            }
        }
    }

    fn project(&self, doc: &Value, fields: &[Field]) -> Value {
        if fields.is_empty() {
            return doc.clone();
        }

        let mut out = Map::new();
        for field in fields {
            match field {
                Field::Plain(name) => {
                    if let Some(value) = doc.get(*name) {
                        out.insert(name.to_string(), value.clone());
                    }
                }
                Field::Expand {
                    alias,
                    source,
                    fields,
                } => {
                    let expanded = match doc.get(*source) {
                        Some(Value::Array(refs)) => Value::Array(
                            refs.iter().map(|r| self.dereference(r, fields)).collect(),
                        ),
                        Some(single @ Value::Object(_)) => self.dereference(single, fields),
                        _ => continue,
                    };
                    out.insert(alias.to_string(), expanded);
                }
            }
        }
        Value::Object(out)
    }

    // 參照目標不存在時回傳 null，與遠端行為一致
    fn dereference(&self, reference: &Value, fields: &[Field]) -> Value {
        reference
            .get("_ref")
            .and_then(Value::as_str)
            .and_then(|id| self.get(id))
            .map(|target| self.project(target, fields))
            .unwrap_or(Value::Null)
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}

fn holds(doc: &Value, predicate: &Predicate, params: &BTreeMap<String, Value>) -> bool {
    match predicate {
        Predicate::Equals { field, param } => match (lookup(doc, field), params.get(*param)) {
            (Some(value), Some(expected)) => value == expected,
            _ => false,
        },
        Predicate::SlugEquals { param } => {
            match (lookup(doc, "slug.current"), params.get(*param)) {
                (Some(value), Some(expected)) => value == expected,
                _ => false,
            }
        }
        Predicate::StartsWith { field, param } => {
            let value = lookup(doc, field).and_then(Value::as_str);
            let prefix = params.get(*param).and_then(Value::as_str);
            matches!((value, prefix), (Some(v), Some(p)) if v.starts_with(p))
        }
        Predicate::References { field, param } => {
            let Some(target) = params.get(*param).and_then(Value::as_str) else {
                return false;
            };
            lookup(doc, field)
                .and_then(Value::as_array)
                .is_some_and(|refs| {
                    refs.iter()
                        .any(|r| r.get("_ref").and_then(Value::as_str) == Some(target))
                })
        }
        Predicate::Matches { field, param } => {
            let value = lookup(doc, field).and_then(Value::as_str);
            let pattern = params.get(*param).and_then(Value::as_str);
            matches!((value, pattern), (Some(v), Some(p)) if text_matches(v, p))
        }
        Predicate::Defined { field } => lookup(doc, field).is_some(),
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '*')
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Approximates GROQ `match`: every pattern token must match some text token,
/// case-insensitively, with `*` as a prefix/suffix wildcard.
pub fn text_matches(text: &str, pattern: &str) -> bool {
    let words: Vec<String> = tokens(text)
        .into_iter()
        .map(|word| word.replace('*', ""))
        .collect();

    tokens(pattern).iter().all(|term| {
        let leading = term.starts_with('*');
        let trailing = term.ends_with('*');
        let core = term.trim_matches('*');
        if core.is_empty() {
            return true;
        }
        words.iter().any(|word| match (leading, trailing) {
            (true, true) => word.contains(core),
            (true, false) => word.ends_with(core),
            (false, true) => word.starts_with(core),
            (false, false) => word == core,
        })
    })
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn execute(&self, query: &Query) -> Result<Value> {
        Ok(self.evaluate(query))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
