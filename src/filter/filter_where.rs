use crate::database::models::RecordFields;

use super::types::{Predicate, RecordField, RecordFilter, SqlParam};

/// Renders a [`RecordFilter`] as a parameterised SQL `WHERE` body, or
/// evaluates it directly against a record.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the `WHERE` body and its parameters. Placeholders start at
    /// `$starting_param_index + 1`.
    pub fn generate(filter: &RecordFilter, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let conditions: Vec<String> = filter
            .predicates
            .iter()
            .filter_map(|p| filter_where.build_sql_condition(p))
            .collect();
        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        (where_clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, predicate: &Predicate) -> Option<String> {
        match predicate {
            Predicate::ContainsAny { fields, needle } => {
                if fields.is_empty() {
                    return Some("1=0".to_string());
                }
                let placeholder = self.param(SqlParam::Text(Some(like_pattern(needle))));
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| format!("\"{}\" ILIKE {}", f.column(), placeholder))
                    .collect();
                Some(format!("({})", parts.join(" OR ")))
            }
            Predicate::Contains { field, needle } => {
                let placeholder = self.param(SqlParam::Text(Some(like_pattern(needle))));
                Some(format!("\"{}\" ILIKE {}", field.column(), placeholder))
            }
            Predicate::Equals { field, value } => {
                let placeholder = self.param(SqlParam::Text(Some(value.clone())));
                Some(format!("\"{}\" = {}", field.column(), placeholder))
            }
            Predicate::AgeRange { min, max } => {
                let column = RecordField::Age.column();
                let mut bounds = vec![];
                if let Some(min) = min {
                    bounds.push(format!("\"{}\" >= {}", column, self.param(SqlParam::Float(*min))));
                }
                if let Some(max) = max {
                    bounds.push(format!("\"{}\" <= {}", column, self.param(SqlParam::Float(*max))));
                }
                if bounds.is_empty() {
                    None
                } else {
                    Some(format!("({})", bounds.join(" AND ")))
                }
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// In-memory evaluation with the same semantics as the generated SQL.
    pub fn matches(filter: &RecordFilter, fields: &RecordFields) -> bool {
        filter.predicates.iter().all(|p| Self::matches_predicate(p, fields))
    }

    fn matches_predicate(predicate: &Predicate, fields: &RecordFields) -> bool {
        match predicate {
            Predicate::ContainsAny { fields: targets, needle } => {
                let needle = needle.to_lowercase();
                targets
                    .iter()
                    .any(|f| contains_ignore_case(f.text(fields), &needle))
            }
            Predicate::Contains { field, needle } => {
                contains_ignore_case(field.text(fields), &needle.to_lowercase())
            }
            Predicate::Equals { field, value } => field.text(fields) == Some(value.as_str()),
            Predicate::AgeRange { min, max } => match fields.age {
                Some(age) => {
                    let age = age as f64;
                    min.map_or(true, |m| age >= m) && max.map_or(true, |m| age <= m)
                }
                None => false,
            },
        }
    }
}

fn contains_ignore_case(haystack: Option<&str>, lowered_needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(lowered_needle))
}

/// `%term%` with LIKE metacharacters escaped, so user input is matched
/// literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
