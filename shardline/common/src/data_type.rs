use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Logical SQL type of a column as declared in table metadata.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Char,
    #[default]
    Varchar,
    Text,
    Date,
    Time,
    Timestamp,
    Bytea,
}

impl DataType {
    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::SmallInt | DataType::Integer | DataType::BigInt)
    }

    pub fn is_character(&self) -> bool {
        matches!(self, DataType::Char | DataType::Varchar | DataType::Text)
    }
}
