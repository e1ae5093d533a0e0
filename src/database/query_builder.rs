use sqlx::postgres::{PgArguments, PgRow};
use sqlx::FromRow;

use crate::filter::SqlParam;

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_deref()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::BigInt(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.as_deref()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::BigInt(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
    }
}

pub fn bind_param_query_scalar<'q, O>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_deref()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::BigInt(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
    }
}
