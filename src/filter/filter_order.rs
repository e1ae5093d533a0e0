use std::cmp::Ordering;

use crate::database::models::Record;

use super::types::{RecordField, SortDirection, SortSpec};

/// What a requested sort field resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget {
    Field(RecordField),
    Id,
    /// No record carries the field, so every record ties.
    Missing,
}

pub struct FilterOrder;

impl FilterOrder {
    pub fn resolve(field: &str) -> SortTarget {
        match field {
            "_id" | "id" => SortTarget::Id,
            other => RecordField::from_name(other)
                .map(SortTarget::Field)
                .unwrap_or(SortTarget::Missing),
        }
    }

    /// `ORDER BY` clause. Nulls sort lowest and ties break on id ascending.
    pub fn generate(sort: &SortSpec) -> String {
        let dir = sort.direction.to_sql();
        let nulls = match sort.direction {
            SortDirection::Asc => "NULLS FIRST",
            SortDirection::Desc => "NULLS LAST",
        };
        match Self::resolve(&sort.field) {
            SortTarget::Field(RecordField::Age) => {
                format!("ORDER BY \"age\" {} {}, \"id\" ASC", dir, nulls)
            }
            SortTarget::Field(field) => format!(
                "ORDER BY \"{}\" COLLATE \"C\" {} {}, \"id\" ASC",
                field.column(),
                dir,
                nulls
            ),
            SortTarget::Id => format!("ORDER BY \"id\" {}", dir),
            SortTarget::Missing => "ORDER BY \"id\" ASC".to_string(),
        }
    }

    /// Comparator matching [`FilterOrder::generate`] for in-memory stores.
    pub fn compare(sort: &SortSpec, a: &Record, b: &Record) -> Ordering {
        let primary = match Self::resolve(&sort.field) {
            SortTarget::Field(RecordField::Age) => a.fields.age.cmp(&b.fields.age),
            SortTarget::Field(field) => field.text(&a.fields).cmp(&field.text(&b.fields)),
            SortTarget::Id => a.id.cmp(&b.id),
            SortTarget::Missing => Ordering::Equal,
        };
        let primary = match sort.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::RecordFields;
    use crate::database::object_id::ObjectId;

    fn record(name: Option<&str>, age: Option<i32>) -> Record {
        Record {
            id: ObjectId::new(),
            fields: RecordFields {
                name: name.map(String::from),
                age,
                ..Default::default()
            },
        }
    }

    fn sorted(field: &str, direction: SortDirection, mut records: Vec<Record>) -> Vec<Option<String>> {
        let spec = SortSpec { field: field.into(), direction };
        records.sort_by(|a, b| FilterOrder::compare(&spec, a, b));
        records.into_iter().map(|r| r.fields.name).collect()
    }

    #[test]
    fn generates_text_order_with_binary_collation() {
        let spec = SortSpec { field: "name".into(), direction: SortDirection::Asc };
        assert_eq!(
            FilterOrder::generate(&spec),
            "ORDER BY \"name\" COLLATE \"C\" ASC NULLS FIRST, \"id\" ASC"
        );
    }

    #[test]
    fn generates_age_order_desc() {
        let spec = SortSpec { field: "age".into(), direction: SortDirection::Desc };
        assert_eq!(FilterOrder::generate(&spec), "ORDER BY \"age\" DESC NULLS LAST, \"id\" ASC");
    }

    #[test]
    fn unknown_field_falls_back_to_id_order() {
        let spec = SortSpec { field: "nope\"; DROP TABLE records".into(), direction: SortDirection::Desc };
        assert_eq!(FilterOrder::generate(&spec), "ORDER BY \"id\" ASC");
    }

    #[test]
    fn missing_values_sort_lowest() {
        let records = vec![record(Some("b"), Some(40)), record(None, None), record(Some("a"), Some(20))];
        assert_eq!(
            sorted("name", SortDirection::Asc, records.clone()),
            vec![None, Some("a".into()), Some("b".into())]
        );
        assert_eq!(
            sorted("age", SortDirection::Desc, records),
            vec![Some("b".into()), Some("a".into()), None]
        );
    }

    #[test]
    fn unknown_field_keeps_creation_order() {
        let records = vec![record(Some("z"), None), record(Some("a"), None), record(Some("m"), None)];
        assert_eq!(
            sorted("favourite_colour", SortDirection::Desc, records),
            vec![Some("z".into()), Some("a".into()), Some("m".into())]
        );
    }
}
