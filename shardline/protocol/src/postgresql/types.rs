//! PostgreSQL type oids and the text/binary value formats.

use bytes::Bytes;
use shardline_common::data_type::DataType;
use shardline_common::error::not_implemented;
use shardline_common::value::ScalarValue;
use strum::{Display, EnumIter};

use super::message::ValueFormat;
use crate::error::{ProtocolError, ProtocolResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PgType {
    /// Oid 0, left for the server to infer.
    #[default]
    Unspecified,
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Bpchar,
    Varchar,
    Text,
    Date,
    Time,
    Timestamp,
    Bytea,
}

impl PgType {
    pub fn oid(self) -> u32 {
        match self {
            PgType::Unspecified => 0,
            PgType::Bool => 16,
            PgType::Bytea => 17,
            PgType::Int8 => 20,
            PgType::Int2 => 21,
            PgType::Int4 => 23,
            PgType::Text => 25,
            PgType::Float4 => 700,
            PgType::Float8 => 701,
            PgType::Bpchar => 1042,
            PgType::Varchar => 1043,
            PgType::Date => 1082,
            PgType::Time => 1083,
            PgType::Timestamp => 1114,
            PgType::Numeric => 1700,
        }
    }

    /// Returns `None` for oids outside the supported set.
    pub fn from_oid(oid: u32) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|ty| ty.oid() == oid)
    }

    /// The `typlen` reported in RowDescription, `-1` for variable length types.
    pub fn type_len(self) -> i16 {
        match self {
            PgType::Bool => 1,
            PgType::Int2 => 2,
            PgType::Int4 | PgType::Float4 | PgType::Date => 4,
            PgType::Int8 | PgType::Float8 | PgType::Time | PgType::Timestamp => 8,
            PgType::Unspecified
            | PgType::Numeric
            | PgType::Bpchar
            | PgType::Varchar
            | PgType::Text
            | PgType::Bytea => -1,
        }
    }
}

impl From<DataType> for PgType {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => PgType::Bool,
            DataType::SmallInt => PgType::Int2,
            DataType::Integer => PgType::Int4,
            DataType::BigInt => PgType::Int8,
            DataType::Real => PgType::Float4,
            DataType::Double => PgType::Float8,
            DataType::Numeric => PgType::Numeric,
            DataType::Char => PgType::Bpchar,
            DataType::Varchar => PgType::Varchar,
            DataType::Text => PgType::Text,
            DataType::Date => PgType::Date,
            DataType::Time => PgType::Time,
            DataType::Timestamp => PgType::Timestamp,
            DataType::Bytea => PgType::Bytea,
        }
    }
}

/// Decodes the raw value of parameter `index` from a Bind message.
pub fn decode_parameter(
    index: usize,
    ty: PgType,
    format: ValueFormat,
    raw: Option<&[u8]>,
) -> ProtocolResult<ScalarValue> {
    let Some(raw) = raw else {
        return Ok(ScalarValue::Null);
    };
    let invalid = |message: &str| ProtocolError::InvalidParameter {
        index,
        kind: match format {
            ValueFormat::Text => "text",
            ValueFormat::Binary => "binary",
        },
        message: format!("{message} for type {ty}").into(),
    };
    match format {
        ValueFormat::Text => {
            let text = std::str::from_utf8(raw).map_err(|_| invalid("invalid utf-8"))?;
            decode_text(ty, text).ok_or_else(|| invalid("malformed value"))
        }
        ValueFormat::Binary => decode_binary(ty, raw)?.ok_or_else(|| invalid("wrong length")),
    }
}

fn decode_text(ty: PgType, text: &str) -> Option<ScalarValue> {
    let value = match ty {
        PgType::Bool => match text.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => ScalarValue::Boolean(true),
            "f" | "false" | "n" | "no" | "off" | "0" => ScalarValue::Boolean(false),
            _ => return None,
        },
        PgType::Int2 => ScalarValue::Int16(text.trim().parse().ok()?),
        PgType::Int4 => ScalarValue::Int32(text.trim().parse().ok()?),
        PgType::Int8 => ScalarValue::Int64(text.trim().parse().ok()?),
        PgType::Float4 => ScalarValue::Float32(text.trim().parse().ok()?),
        PgType::Float8 => ScalarValue::Float64(text.trim().parse().ok()?),
        PgType::Numeric => {
            let text = text.trim();
            text.parse::<f64>().ok()?;
            ScalarValue::Decimal(text.into())
        }
        PgType::Bytea => match text.strip_prefix("\\x") {
            Some(hex) => ScalarValue::Bytes(decode_hex(hex)?),
            None => ScalarValue::Bytes(text.as_bytes().to_vec()),
        },
        PgType::Unspecified
        | PgType::Bpchar
        | PgType::Varchar
        | PgType::Text
        | PgType::Date
        | PgType::Time
        | PgType::Timestamp => ScalarValue::String(text.to_owned()),
    };
    Some(value)
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Returns `Ok(None)` when `raw` has the wrong length for `ty`.
fn decode_binary(ty: PgType, raw: &[u8]) -> ProtocolResult<Option<ScalarValue>> {
    let value = match ty {
        PgType::Bool => match raw {
            [byte] => Some(ScalarValue::Boolean(*byte != 0)),
            _ => None,
        },
        PgType::Int2 => raw
            .try_into()
            .ok()
            .map(|b| ScalarValue::Int16(i16::from_be_bytes(b))),
        PgType::Int4 => raw
            .try_into()
            .ok()
            .map(|b| ScalarValue::Int32(i32::from_be_bytes(b))),
        PgType::Int8 => raw
            .try_into()
            .ok()
            .map(|b| ScalarValue::Int64(i64::from_be_bytes(b))),
        PgType::Float4 => raw
            .try_into()
            .ok()
            .map(|b| ScalarValue::Float32(f32::from_be_bytes(b))),
        PgType::Float8 => raw
            .try_into()
            .ok()
            .map(|b| ScalarValue::Float64(f64::from_be_bytes(b))),
        PgType::Bpchar | PgType::Varchar | PgType::Text => std::str::from_utf8(raw)
            .ok()
            .map(|s| ScalarValue::String(s.to_owned())),
        PgType::Bytea | PgType::Unspecified => Some(ScalarValue::Bytes(raw.to_vec())),
        PgType::Numeric | PgType::Date | PgType::Time | PgType::Timestamp => {
            return not_implemented(format!("binary {ty} parameters"), None);
        }
    };
    Ok(value)
}

/// Encodes one result cell, `None` being SQL `NULL`.
pub fn encode_value(value: &ScalarValue, format: ValueFormat) -> ProtocolResult<Option<Bytes>> {
    if value.is_null() {
        return Ok(None);
    }
    let bytes = match format {
        ValueFormat::Text => Bytes::from(value.to_string()),
        ValueFormat::Binary => match value {
            ScalarValue::Null => return Ok(None),
            ScalarValue::Boolean(v) => Bytes::copy_from_slice(&[u8::from(*v)]),
            ScalarValue::Int16(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            ScalarValue::Int32(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            ScalarValue::Int64(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            ScalarValue::Float32(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            ScalarValue::Float64(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            ScalarValue::String(v) => Bytes::copy_from_slice(v.as_bytes()),
            ScalarValue::Bytes(v) => Bytes::copy_from_slice(v),
            ScalarValue::Decimal(_) => return not_implemented("binary numeric results", None),
        },
    };
    Ok(Some(bytes))
}
