//! Conversion of Postgres rows into JSON objects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use common::errors::{AppError, AppResult};
use serde_json::{json, Map, Number, Value};
use sqlx::error::BoxDynError;
use sqlx::postgres::types::{Oid, PgInterval};
use sqlx::postgres::{PgRow, PgTypeInfo, PgTypeKind, PgValueFormat, PgValueRef};
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::types::BigDecimal;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};

/// Converts a row into an object keyed by column name, in column order.
///
/// A column whose type has no JSON rendering fails the whole row.
pub fn row_to_json(row: &PgRow) -> AppResult<Value> {
    let mut object = Map::with_capacity(row.columns().len());
    for column in row.columns() {
        let raw = row.try_get_raw(column.ordinal())?;
        let value = decode_value(raw).map_err(|failure| failure.into_error(column.name()))?;
        object.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(object))
}

enum DecodeFailure {
    Unsupported(String),
    Invalid { type_name: String, source: BoxDynError },
}

impl DecodeFailure {
    fn into_error(self, column: &str) -> AppError {
        match self {
            DecodeFailure::Unsupported(type_name) => AppError::UnsupportedColumnType {
                column: column.to_string(),
                type_name,
            },
            DecodeFailure::Invalid { type_name, source } => AppError::DatabaseQuery(format!(
                "cannot decode column {column} of type {type_name}: {source}"
            )),
        }
    }
}

fn decode_value(raw: PgValueRef<'_>) -> Result<Value, DecodeFailure> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_info = raw.type_info().into_owned();
    let base = base_type(&type_info);
    let type_name = base.name().to_string();

    let decoded = if matches!(base.kind(), PgTypeKind::Enum(_)) {
        // enum labels travel as text
        decode::<String>(raw).map(Value::String)
    } else {
        match decode_by_type(&type_name, raw) {
            Some(result) => result,
            None => return Err(DecodeFailure::Unsupported(type_info.name().to_string())),
        }
    };
    decoded.map_err(|source| DecodeFailure::Invalid { type_name, source })
}

/// Domains share the wire format of the type they are based on.
fn base_type(info: &PgTypeInfo) -> &PgTypeInfo {
    match info.kind() {
        PgTypeKind::Domain(base) => base_type(base),
        _ => info,
    }
}

type DecodeResult = Result<Value, BoxDynError>;

fn decode<'r, T: Decode<'r, Postgres>>(raw: PgValueRef<'r>) -> Result<T, BoxDynError> {
    T::decode(raw)
}

/// Decodes a one-dimensional array, mapping each present element with `render`.
fn array<T, F>(raw: PgValueRef<'_>, render: F) -> DecodeResult
where
    T: for<'a> Decode<'a, Postgres> + Type<Postgres>,
    F: Fn(T) -> Value,
{
    let elements = decode::<Vec<Option<T>>>(raw)?;
    Ok(Value::Array(
        elements
            .into_iter()
            .map(|element| element.map_or(Value::Null, &render))
            .collect(),
    ))
}

/// Returns `None` when `type_name` has no JSON rendering.
fn decode_by_type(type_name: &str, raw: PgValueRef<'_>) -> Option<DecodeResult> {
    let result = match type_name {
        "BOOL" => decode::<bool>(raw).map(Value::Bool),
        "INT2" => decode::<i16>(raw).map(Value::from),
        "INT4" => decode::<i32>(raw).map(Value::from),
        "INT8" => decode::<i64>(raw).map(Value::from),
        "FLOAT4" => decode::<f32>(raw).map(|v| float(f64::from(v))),
        "FLOAT8" => decode::<f64>(raw).map(float),
        "NUMERIC" => decode::<NumericText>(raw).map(|n| Value::String(n.0)),
        "OID" => decode::<Oid>(raw).map(|oid| Value::from(oid.0)),
        "\"CHAR\"" => decode::<i8>(raw).map(|v| Value::String(char::from(v as u8).to_string())),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" | "CITEXT" | "UNKNOWN" | "XML" => {
            decode::<String>(raw).map(Value::String)
        }
        // reg* types travel as plain oids in binary format
        "REGPROC" | "REGCLASS" | "REGTYPE" => decode::<Oid>(raw).map(|oid| Value::from(oid.0)),
        "JSON" | "JSONB" => decode::<Value>(raw),
        "UUID" => decode::<uuid::Uuid>(raw).map(|v| Value::String(v.to_string())),
        "TIMESTAMPTZ" => decode::<DateTime<Utc>>(raw).map(timestamptz),
        "TIMESTAMP" => decode::<NaiveDateTime>(raw).map(timestamp),
        "DATE" => decode::<NaiveDate>(raw).map(|v| Value::String(v.to_string())),
        "TIME" => decode::<NaiveTime>(raw).map(|v| Value::String(v.to_string())),
        "INTERVAL" => decode::<PgInterval>(raw).map(interval),
        "INET" => decode::<IpNetwork>(raw).map(inet),
        "CIDR" => decode::<IpNetwork>(raw).map(|v| Value::String(v.to_string())),
        "BYTEA" => decode::<Vec<u8>>(raw).map(|v| Value::String(bytea_hex(&v))),

        "TEXT[]" | "VARCHAR[]" | "NAME[]" | "CHAR[]" | "BPCHAR[]" => {
            array::<String, _>(raw, Value::String)
        }
        "INT2[]" => array::<i16, _>(raw, Value::from),
        "INT4[]" => array::<i32, _>(raw, Value::from),
        "INT8[]" => array::<i64, _>(raw, Value::from),
        "BOOL[]" => array::<bool, _>(raw, Value::Bool),
        "OID[]" => array::<Oid, _>(raw, |oid| Value::from(oid.0)),
        "FLOAT4[]" => array::<f32, _>(raw, |v| float(f64::from(v))),
        "FLOAT8[]" => array::<f64, _>(raw, float),
        "NUMERIC[]" => array::<NumericText, _>(raw, |n| Value::String(n.0)),
        "UUID[]" => array::<uuid::Uuid, _>(raw, |v| Value::String(v.to_string())),
        "JSON[]" | "JSONB[]" => array::<Value, _>(raw, |v| v),
        "TIMESTAMPTZ[]" => array::<DateTime<Utc>, _>(raw, timestamptz),
        "INTERVAL[]" => array::<PgInterval, _>(raw, interval),
        "INET[]" => array::<IpNetwork, _>(raw, inet),
        "CIDR[]" => array::<IpNetwork, _>(raw, |v| Value::String(v.to_string())),
        _ => return None,
    };
    Some(result)
}

// NaN and infinities have no JSON form.
fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn timestamptz(v: DateTime<Utc>) -> Value {
    Value::String(v.to_rfc3339())
}

fn timestamp(v: NaiveDateTime) -> Value {
    Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

/// Host addresses print without the prefix length, as Postgres does.
fn inet(v: IpNetwork) -> Value {
    let host_prefix = if v.is_ipv4() { 32 } else { 128 };
    if v.prefix() == host_prefix {
        Value::String(v.ip().to_string())
    } else {
        Value::String(v.to_string())
    }
}

/// Intervals keep their three independent components.
fn interval(v: PgInterval) -> Value {
    json!({
        "months": v.months,
        "days": v.days,
        "microseconds": v.microseconds,
    })
}

/// Postgres hex output format, e.g. `\xdeadbeef`.
fn bytea_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// A `numeric` rendered as Postgres prints it: plain notation, declared scale kept.
struct NumericText(String);

impl Type<Postgres> for NumericText {
    fn type_info() -> PgTypeInfo {
        <BigDecimal as Type<Postgres>>::type_info()
    }
}

const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_POS_INF: u16 = 0xD000;
const NUMERIC_NEG_INF: u16 = 0xF000;

impl<'r> Decode<'r, Postgres> for NumericText {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.format() == PgValueFormat::Text {
            return Ok(NumericText(value.as_str()?.to_string()));
        }
        // header: ndigits, weight, sign, dscale (all 16-bit)
        let bytes = value.as_bytes()?;
        if bytes.len() < 8 {
            return Err("numeric value is truncated".into());
        }
        let sign = u16::from_be_bytes([bytes[4], bytes[5]]);
        let display_scale = u16::from_be_bytes([bytes[6], bytes[7]]);
        if let Some(special) = numeric_special(sign) {
            return Ok(NumericText(special.to_string()));
        }

        let decimal = BigDecimal::decode(value)?.with_scale(i64::from(display_scale));
        let (unscaled, scale) = decimal.as_bigint_and_exponent();
        Ok(NumericText(plain_decimal(&unscaled.to_string(), scale)))
    }
}

fn numeric_special(sign: u16) -> Option<&'static str> {
    match sign {
        NUMERIC_NAN => Some("NaN"),
        NUMERIC_POS_INF => Some("Infinity"),
        NUMERIC_NEG_INF => Some("-Infinity"),
        _ => None,
    }
}

/// Places the decimal point `scale` digits from the right of `unscaled`.
fn plain_decimal(unscaled: &str, scale: i64) -> String {
    let (sign, digits) = match unscaled.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", unscaled),
    };
    if scale <= 0 {
        if digits == "0" {
            return "0".to_string();
        }
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        return format!("{sign}{digits}{zeros}");
    }

    let scale = scale as usize;
    let digits = if digits.len() <= scale {
        format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
    } else {
        digits.to_string()
    };
    let (integer, fraction) = digits.split_at(digits.len() - scale);
    format!("{sign}{integer}.{fraction}")
}
