use crate::models::expense::ExpenseError;
use crate::models::row::{ColumnValue, ExpenseRow};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::types::{PgInterval, PgMoney};
use sqlx::postgres::{PgRow, PgTypeInfo, PgTypeKind};
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};
use uuid::Uuid;

/// Converts one result row. `TIMESTAMPTZ` values are dated in `session_offset`.
pub fn decode_row(row: &PgRow, session_offset: FixedOffset) -> Result<ExpenseRow, ExpenseError> {
    let mut decoded = ExpenseRow::default();

    for column in row.columns() {
        let type_info = column.type_info();
        let value = decode_column(row, column.ordinal(), type_info, session_offset).map_err(|e| {
            ExpenseError::Backend(format!(
                "Unsupported value in column {} ({}): {}",
                column.name(),
                type_info.name(),
                e
            ))
        })?;
        decoded.push(column.name(), value);
    }

    Ok(decoded)
}

fn decode_column(
    row: &PgRow,
    index: usize,
    type_info: &PgTypeInfo,
    session_offset: FixedOffset,
) -> Result<ColumnValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(ColumnValue::Null);
    }

    // Enum labels travel as plain text, which the checked String decode refuses.
    if let PgTypeKind::Enum(_) = type_info.kind() {
        return Ok(ColumnValue::Text(row.try_get_unchecked::<String, _>(index)?));
    }

    let value = match type_info.name() {
        "BOOL" => ColumnValue::Bool(row.try_get(index)?),
        "INT2" => ColumnValue::Int(row.try_get::<i16, _>(index)?.into()),
        "INT4" => ColumnValue::Int(row.try_get::<i32, _>(index)?.into()),
        "INT8" => ColumnValue::Int(row.try_get(index)?),
        "FLOAT4" => ColumnValue::Float(row.try_get::<f32, _>(index)?.into()),
        "FLOAT8" => ColumnValue::Float(row.try_get(index)?),
        "NUMERIC" => ColumnValue::Numeric(row.try_get::<Decimal, _>(index)?),
        "MONEY" => ColumnValue::Numeric(row.try_get::<PgMoney, _>(index)?.to_decimal(2)),
        "DATE" => ColumnValue::Date(row.try_get::<NaiveDate, _>(index)?),
        "TIMESTAMP" => ColumnValue::Date(row.try_get::<NaiveDateTime, _>(index)?.date()),
        "TIMESTAMPTZ" => ColumnValue::Date(
            row.try_get::<DateTime<Utc>, _>(index)?
                .with_timezone(&session_offset)
                .date_naive(),
        ),
        "TIME" => ColumnValue::Text(row.try_get::<NaiveTime, _>(index)?.to_string()),
        "INTERVAL" => ColumnValue::Text(interval_text(row.try_get::<PgInterval, _>(index)?)),
        "INET" | "CIDR" => ColumnValue::Text(network_text(row.try_get::<IpNetwork, _>(index)?)),
        "UUID" => ColumnValue::Text(row.try_get::<Uuid, _>(index)?.to_string()),
        "JSON" | "JSONB" => ColumnValue::Json(row.try_get::<serde_json::Value, _>(index)?),
        "BOOL[]" => decode_array(row, index, ColumnValue::Bool)?,
        "INT2[]" => decode_array(row, index, |v: i16| ColumnValue::Int(v.into()))?,
        "INT4[]" => decode_array(row, index, |v: i32| ColumnValue::Int(v.into()))?,
        "INT8[]" => decode_array(row, index, ColumnValue::Int)?,
        "FLOAT4[]" => decode_array(row, index, |v: f32| ColumnValue::Float(v.into()))?,
        "FLOAT8[]" => decode_array(row, index, ColumnValue::Float)?,
        "NUMERIC[]" => decode_array(row, index, ColumnValue::Numeric)?,
        "DATE[]" => decode_array(row, index, ColumnValue::Date)?,
        "UUID[]" => decode_array(row, index, |v: Uuid| ColumnValue::Text(v.to_string()))?,
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            decode_array(row, index, ColumnValue::Text)?
        }
        _ => ColumnValue::Text(row.try_get::<String, _>(index)?),
    };

    Ok(value)
}

fn decode_array<T>(
    row: &PgRow,
    index: usize,
    wrap: fn(T) -> ColumnValue,
) -> Result<ColumnValue, sqlx::Error>
where
    Vec<Option<T>>: for<'r> Decode<'r, Postgres> + Type<Postgres>,
{
    let items: Vec<Option<T>> = row.try_get(index)?;

    Ok(ColumnValue::Array(
        items
            .into_iter()
            .map(|item| item.map_or(ColumnValue::Null, wrap))
            .collect(),
    ))
}

/// ISO 8601 duration, e.g. `P1M2DT3600S`.
fn interval_text(interval: PgInterval) -> String {
    format!(
        "P{}M{}DT{}S",
        interval.months,
        interval.days,
        Decimal::new(interval.microseconds, 6).normalize()
    )
}

/// Host addresses print without their prefix, as PostgreSQL does.
fn network_text(network: IpNetwork) -> String {
    let host_prefix = if network.is_ipv4() { 32 } else { 128 };
    if network.prefix() == host_prefix {
        network.ip().to_string()
    } else {
        network.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_renders_as_iso_duration() {
        let interval = PgInterval {
            months: 1,
            days: 2,
            microseconds: 3_600_500_000,
        };

        assert_eq!(interval_text(interval), "P1M2DT3600.5S");
    }

    #[test]
    fn host_networks_drop_their_prefix() {
        assert_eq!(network_text("10.0.0.7/32".parse().unwrap()), "10.0.0.7");
        assert_eq!(network_text("10.0.0.0/8".parse().unwrap()), "10.0.0.0/8");
    }
}
