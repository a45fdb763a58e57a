use bytes::Bytes;
use smol_str::SmolStr;
use strum::{AsRefStr, Display};

use super::types::PgType;

/// The encoding of a parameter or result column on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueFormat {
    #[default]
    Text,
    Binary,
}

impl ValueFormat {
    #[inline]
    pub fn code(self) -> i16 {
        match self {
            ValueFormat::Text => 0,
            ValueFormat::Binary => 1,
        }
    }

    #[inline]
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ValueFormat::Text),
            1 => Some(ValueFormat::Binary),
            _ => None,
        }
    }

    /// Picks the format of value `index` from a Bind format list.
    ///
    /// No entries means all text, a single entry applies to every value.
    pub fn select(formats: &[ValueFormat], index: usize) -> ValueFormat {
        match formats {
            [] => ValueFormat::Text,
            [format] => *format,
            formats => formats.get(index).copied().unwrap_or_default(),
        }
    }
}

/// One column of a RowDescription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: SmolStr,
    pub table_oid: u32,
    pub column_id: u16,
    pub data_type: PgType,
    pub type_modifier: i32,
    pub format: ValueFormat,
}

impl FieldDescription {
    pub fn new(name: impl Into<SmolStr>, data_type: PgType, format: ValueFormat) -> Self {
        Self {
            name: name.into(),
            table_oid: 0,
            column_id: 0,
            data_type,
            type_modifier: -1,
            format,
        }
    }
}

/// A packet sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMessage {
    ParseComplete,
    BindComplete,
    CloseComplete,
    NoData,
    PortalSuspended,
    EmptyQueryResponse,
    RowDescription(Vec<FieldDescription>),
    /// The type oid of every parameter of a prepared statement.
    ParameterDescription(Vec<PgType>),
    /// Encoded cells, `None` being SQL `NULL`.
    DataRow(Vec<Option<Bytes>>),
    CommandComplete {
        tag: String,
    },
    ParameterStatus {
        name: SmolStr,
        value: SmolStr,
    },
}

impl BackendMessage {
    /// The type byte preceding the packet on the wire.
    pub fn type_byte(&self) -> u8 {
        match self {
            BackendMessage::ParseComplete => b'1',
            BackendMessage::BindComplete => b'2',
            BackendMessage::CloseComplete => b'3',
            BackendMessage::NoData => b'n',
            BackendMessage::PortalSuspended => b's',
            BackendMessage::EmptyQueryResponse => b'I',
            BackendMessage::RowDescription(_) => b'T',
            BackendMessage::ParameterDescription(_) => b't',
            BackendMessage::DataRow(_) => b'D',
            BackendMessage::CommandComplete { .. } => b'C',
            BackendMessage::ParameterStatus { .. } => b'S',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMessage {
    pub portal: SmolStr,
    pub statement: SmolStr,
    pub parameter_formats: Vec<ValueFormat>,
    /// Raw parameter values, `None` being SQL `NULL`.
    pub parameters: Vec<Option<Bytes>>,
    pub result_formats: Vec<ValueFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DescribeTarget {
    #[strum(serialize = "statement")]
    Statement,
    #[strum(serialize = "portal")]
    Portal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeMessage {
    pub target: DescribeTarget,
    pub name: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteMessage {
    pub portal: SmolStr,
    /// Zero or negative means no limit.
    pub max_rows: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseMessage {
    pub target: DescribeTarget,
    pub name: SmolStr,
}

/// A client packet handled by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendMessage {
    Bind(BindMessage),
    Describe(DescribeMessage),
    Execute(ExecuteMessage),
    Close(CloseMessage),
    Sync,
    Flush,
}
