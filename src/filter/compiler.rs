use std::collections::HashMap;

use super::types::{Predicate, RecordField, RecordFilter, RecordQuery, SortDirection, SortSpec};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_SORT: &str = "name";

/// Turns untrusted query-string parameters into a [`RecordQuery`].
///
/// Compilation never fails: malformed numbers are dropped or replaced by
/// their defaults, and unknown parameters are ignored.
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn compile(params: &HashMap<String, String>) -> RecordQuery {
        RecordQuery {
            filter: Self::filter(params),
            sort: Self::sort(params),
            page: Self::page(params.get("page")),
            page_size: Self::page_size(params.get("pageSize")),
        }
    }

    fn filter(params: &HashMap<String, String>) -> RecordFilter {
        let mut predicates = Vec::new();

        if let Some(search) = non_empty(params.get("search")) {
            predicates.push(Predicate::ContainsAny {
                fields: RecordField::SEARCHABLE.to_vec(),
                needle: search.to_string(),
            });
        }
        if let Some(sex) = non_empty(params.get("sex")) {
            predicates.push(Predicate::Equals {
                field: RecordField::Sex,
                value: sex.to_string(),
            });
        }
        if let Some(caste) = non_empty(params.get("caste")) {
            predicates.push(Predicate::Contains {
                field: RecordField::Caste,
                needle: caste.to_string(),
            });
        }

        let min = params.get("ageMin").and_then(|s| parse_finite(s));
        let max = params.get("ageMax").and_then(|s| parse_finite(s));
        if min.is_some() || max.is_some() {
            predicates.push(Predicate::AgeRange { min, max });
        }

        RecordFilter { predicates }
    }

    fn sort(params: &HashMap<String, String>) -> SortSpec {
        let field = non_empty(params.get("sort")).unwrap_or(DEFAULT_SORT).to_string();
        let direction = match params.get("order").map(String::as_str) {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        SortSpec { field, direction }
    }

    fn page(raw: Option<&String>) -> u64 {
        match raw.and_then(|s| parse_finite(s)).map(f64::floor) {
            Some(n) if n >= 1.0 => n as u64,
            _ => DEFAULT_PAGE,
        }
    }

    fn page_size(raw: Option<&String>) -> u64 {
        match raw.and_then(|s| parse_finite(s)).map(f64::floor) {
            Some(n) if n >= 1.0 => (n as u64).min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_when_empty() {
        let q = QueryCompiler::compile(&HashMap::new());
        assert!(q.filter.is_empty());
        assert_eq!(q.sort, SortSpec { field: "name".into(), direction: SortDirection::Asc });
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 20);
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn search_becomes_or_group_over_text_fields() {
        let q = QueryCompiler::compile(&params(&[("search", "Smith")]));
        assert_eq!(
            q.filter.predicates,
            vec![Predicate::ContainsAny {
                fields: vec![RecordField::Name, RecordField::Address, RecordField::Society],
                needle: "Smith".into(),
            }]
        );
    }

    #[test]
    fn empty_strings_add_no_predicates() {
        let q = QueryCompiler::compile(&params(&[("search", ""), ("sex", ""), ("caste", "")]));
        assert!(q.filter.is_empty());
    }

    #[test]
    fn sex_is_exact_and_caste_is_substring() {
        let q = QueryCompiler::compile(&params(&[("sex", "F"), ("caste", "gen")]));
        assert_eq!(
            q.filter.predicates,
            vec![
                Predicate::Equals { field: RecordField::Sex, value: "F".into() },
                Predicate::Contains { field: RecordField::Caste, needle: "gen".into() },
            ]
        );
    }

    #[test]
    fn age_bounds_drop_malformed_values() {
        let q = QueryCompiler::compile(&params(&[("ageMin", "18"), ("ageMax", "abc")]));
        assert_eq!(
            q.filter.predicates,
            vec![Predicate::AgeRange { min: Some(18.0), max: None }]
        );

        let q = QueryCompiler::compile(&params(&[("ageMin", "NaN"), ("ageMax", "inf")]));
        assert!(q.filter.is_empty());
    }

    #[test]
    fn inverted_age_range_is_kept() {
        let q = QueryCompiler::compile(&params(&[("ageMin", "10"), ("ageMax", "5")]));
        assert_eq!(
            q.filter.predicates,
            vec![Predicate::AgeRange { min: Some(10.0), max: Some(5.0) }]
        );
    }

    #[test]
    fn order_is_desc_only_for_exact_literal() {
        let q = QueryCompiler::compile(&params(&[("sort", "age"), ("order", "desc")]));
        assert_eq!(q.sort, SortSpec { field: "age".into(), direction: SortDirection::Desc });

        let q = QueryCompiler::compile(&params(&[("order", "DESC")]));
        assert_eq!(q.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn unknown_sort_field_passes_through() {
        let q = QueryCompiler::compile(&params(&[("sort", "favourite_colour")]));
        assert_eq!(q.sort.field, "favourite_colour");
    }

    #[test]
    fn page_coercion() {
        for (raw, expected) in [("3", 3), ("2.9", 2), ("0", 1), ("-4", 1), ("0.5", 1), ("x", 1), ("", 1)] {
            let q = QueryCompiler::compile(&params(&[("page", raw)]));
            assert_eq!(q.page, expected, "page={raw}");
        }
    }

    #[test]
    fn page_size_coercion_and_cap() {
        for (raw, expected) in [("50", 50), ("100", 100), ("101", 100), ("5000", 100), ("0", 20), ("-1", 20), ("abc", 20), ("7.8", 7)] {
            let q = QueryCompiler::compile(&params(&[("pageSize", raw)]));
            assert_eq!(q.page_size, expected, "pageSize={raw}");
        }
    }

    #[test]
    fn skip_follows_page_and_size() {
        let q = QueryCompiler::compile(&params(&[("page", "3"), ("pageSize", "25")]));
        assert_eq!(q.skip(), 50);
        assert_eq!(q.limit(), 25);
    }
}
