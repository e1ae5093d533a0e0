use crate::database::models::RecordFields;

/// Queryable record columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    Age,
    Sex,
    Address,
    PartNo,
    Society,
    Caste,
}

impl RecordField {
    /// Fields the free-text `search` parameter scans.
    pub const SEARCHABLE: [RecordField; 3] =
        [RecordField::Name, RecordField::Address, RecordField::Society];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "name" => RecordField::Name,
            "age" => RecordField::Age,
            "sex" => RecordField::Sex,
            "address" => RecordField::Address,
            "part_no" => RecordField::PartNo,
            "society" => RecordField::Society,
            "caste" => RecordField::Caste,
            _ => return None,
        })
    }

    pub fn column(&self) -> &'static str {
        match self {
            RecordField::Name => "name",
            RecordField::Age => "age",
            RecordField::Sex => "sex",
            RecordField::Address => "address",
            RecordField::PartNo => "part_no",
            RecordField::Society => "society",
            RecordField::Caste => "caste",
        }
    }

    /// Text value of this field on a record; `None` for `Age`.
    pub fn text<'a>(&self, fields: &'a RecordFields) -> Option<&'a str> {
        match self {
            RecordField::Name => fields.name.as_deref(),
            RecordField::Age => None,
            RecordField::Sex => fields.sex.as_deref(),
            RecordField::Address => fields.address.as_deref(),
            RecordField::PartNo => fields.part_no.as_deref(),
            RecordField::Society => fields.society.as_deref(),
            RecordField::Caste => fields.caste.as_deref(),
        }
    }
}

/// A single AND-ed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive literal substring match on any of the fields.
    ContainsAny { fields: Vec<RecordField>, needle: String },
    /// Case-insensitive literal substring match.
    Contains { field: RecordField, needle: String },
    /// Exact, case-sensitive equality.
    Equals { field: RecordField, value: String },
    /// Inclusive bounds on `age`. At least one side is set.
    AgeRange { min: Option<f64>, max: Option<f64> },
}

/// Conjunction of predicates. Empty matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub predicates: Vec<Predicate>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Requested ordering. `field` is kept verbatim; stores decide what an
/// unknown field means.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Compiled listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub filter: RecordFilter,
    pub sort: SortSpec,
    pub page: u64,
    pub page_size: u64,
}

impl RecordQuery {
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Typed bind parameter for generated SQL. Nulls carry their column type so
/// Postgres can infer the placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(Option<String>),
    Int(Option<i32>),
    BigInt(i64),
    Float(f64),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
