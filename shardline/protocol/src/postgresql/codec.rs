//! Framing of extended-query packets.
//!
//! Every packet is a type byte, a big-endian `i32` length that counts itself, and a body.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use smol_str::SmolStr;

use super::message::{
    BackendMessage, BindMessage, CloseMessage, DescribeMessage, DescribeTarget, ExecuteMessage,
    FrontendMessage, ValueFormat,
};
use crate::error::{ProtocolError, ProtocolResult};

const MAX_FRAME_LEN: usize = 1 << 30;

fn malformed(message: impl Into<SmolStr>) -> ProtocolError {
    ProtocolError::Malformed(message.into())
}

trait BufMutExt: BufMut {
    fn put_cstr(&mut self, s: &str) {
        self.put_slice(s.as_bytes());
        self.put_u8(b'\0');
    }

    fn put_length_i16(&mut self, len: usize) -> ProtocolResult<()> {
        let len = i16::try_from(len).map_err(|_| malformed("too many fields for an i16 count"))?;
        self.put_i16(len);
        Ok(())
    }
}

impl BufMutExt for BytesMut {}

/// Writes the length of the packet starting at `base` into its placeholder.
fn backfill_length(dst: &mut BytesMut, base: usize) -> ProtocolResult<()> {
    let len = i32::try_from(dst.len() - base)
        .map_err(|_| malformed("encoded message does not fit into an i32 length"))?;
    dst[base..base + 4].copy_from_slice(&len.to_be_bytes());
    Ok(())
}

pub fn encode(message: &BackendMessage, dst: &mut BytesMut) -> ProtocolResult<()> {
    dst.put_u8(message.type_byte());
    let base = dst.len();
    dst.put_u32(0);

    match message {
        BackendMessage::ParseComplete
        | BackendMessage::BindComplete
        | BackendMessage::CloseComplete
        | BackendMessage::NoData
        | BackendMessage::PortalSuspended
        | BackendMessage::EmptyQueryResponse => {}
        BackendMessage::RowDescription(fields) => {
            dst.put_length_i16(fields.len())?;
            for field in fields {
                dst.put_cstr(&field.name);
                dst.put_u32(field.table_oid);
                dst.put_u16(field.column_id);
                dst.put_u32(field.data_type.oid());
                dst.put_i16(field.data_type.type_len());
                dst.put_i32(field.type_modifier);
                dst.put_i16(field.format.code());
            }
        }
        BackendMessage::ParameterDescription(types) => {
            dst.put_length_i16(types.len())?;
            for ty in types {
                dst.put_u32(ty.oid());
            }
        }
        BackendMessage::DataRow(cells) => {
            dst.put_length_i16(cells.len())?;
            for cell in cells {
                match cell {
                    Some(cell) => {
                        let len = i32::try_from(cell.len())
                            .map_err(|_| malformed("data row field does not fit into an i32"))?;
                        dst.put_i32(len);
                        dst.put_slice(cell);
                    }
                    None => dst.put_i32(-1),
                }
            }
        }
        BackendMessage::CommandComplete { tag } => dst.put_cstr(tag),
        BackendMessage::ParameterStatus { name, value } => {
            dst.put_cstr(name);
            dst.put_cstr(value);
        }
    }

    backfill_length(dst, base)
}

/// Splits one complete frame off `src` and decodes it.
///
/// Returns `Ok(None)` until enough bytes have arrived.
pub fn decode_frame(src: &mut BytesMut) -> ProtocolResult<Option<FrontendMessage>> {
    if src.len() < 5 {
        return Ok(None);
    }
    let type_byte = src[0];
    let len = i32::from_be_bytes([src[1], src[2], src[3], src[4]]);
    let len = usize::try_from(len)
        .ok()
        .filter(|len| (4..=MAX_FRAME_LEN).contains(len))
        .ok_or_else(|| malformed(format!("invalid frame length {len}")))?;
    if src.len() < len + 1 {
        src.reserve(len + 1 - src.len());
        return Ok(None);
    }
    src.advance(5);
    let body = src.split_to(len - 4).freeze();
    decode(type_byte, body).map(Some)
}

/// Decodes a frame body of the given type.
pub fn decode(type_byte: u8, body: Bytes) -> ProtocolResult<FrontendMessage> {
    let mut reader = Reader(body);
    let message = match type_byte {
        b'B' => decode_bind(&mut reader)?,
        b'D' => FrontendMessage::Describe(DescribeMessage {
            target: reader.read_target()?,
            name: reader.read_cstr()?,
        }),
        b'E' => FrontendMessage::Execute(ExecuteMessage {
            portal: reader.read_cstr()?,
            max_rows: reader.read_i32()?,
        }),
        b'C' => FrontendMessage::Close(CloseMessage {
            target: reader.read_target()?,
            name: reader.read_cstr()?,
        }),
        b'S' => FrontendMessage::Sync,
        b'H' => FrontendMessage::Flush,
        other => return Err(malformed(format!("unsupported message type {other:#04x}"))),
    };
    if reader.0.has_remaining() {
        return Err(malformed("trailing bytes after message body"));
    }
    Ok(message)
}

fn decode_bind(reader: &mut Reader) -> ProtocolResult<FrontendMessage> {
    let portal = reader.read_cstr()?;
    let statement = reader.read_cstr()?;
    let parameter_formats = reader.read_formats()?;

    let count = reader.read_count()?;
    let mut parameters = Vec::with_capacity(count);
    for _ in 0..count {
        let len = reader.read_i32()?;
        if len == -1 {
            parameters.push(None);
        } else {
            let len = usize::try_from(len)
                .map_err(|_| malformed(format!("invalid parameter length {len}")))?;
            parameters.push(Some(reader.read_bytes(len)?));
        }
    }

    let result_formats = reader.read_formats()?;
    Ok(FrontendMessage::Bind(BindMessage {
        portal,
        statement,
        parameter_formats,
        parameters,
        result_formats,
    }))
}

struct Reader(Bytes);

impl Reader {
    fn ensure(&self, len: usize) -> ProtocolResult<()> {
        if self.0.remaining() < len {
            return Err(malformed("unexpected end of message"));
        }
        Ok(())
    }

    fn read_u8(&mut self) -> ProtocolResult<u8> {
        self.ensure(1)?;
        Ok(self.0.get_u8())
    }

    fn read_i16(&mut self) -> ProtocolResult<i16> {
        self.ensure(2)?;
        Ok(self.0.get_i16())
    }

    fn read_i32(&mut self) -> ProtocolResult<i32> {
        self.ensure(4)?;
        Ok(self.0.get_i32())
    }

    fn read_count(&mut self) -> ProtocolResult<usize> {
        let count = self.read_i16()?;
        usize::try_from(count).map_err(|_| malformed(format!("negative count {count}")))
    }

    fn read_bytes(&mut self, len: usize) -> ProtocolResult<Bytes> {
        self.ensure(len)?;
        Ok(self.0.split_to(len))
    }

    fn read_cstr(&mut self) -> ProtocolResult<SmolStr> {
        let end = self
            .0
            .iter()
            .position(|b| *b == b'\0')
            .ok_or_else(|| malformed("unterminated string"))?;
        let raw = self.0.split_to(end);
        self.0.advance(1);
        let s = std::str::from_utf8(&raw).map_err(|_| malformed("string is not valid utf-8"))?;
        Ok(SmolStr::new(s))
    }

    fn read_formats(&mut self) -> ProtocolResult<Vec<ValueFormat>> {
        let count = self.read_count()?;
        (0..count)
            .map(|_| {
                let code = self.read_i16()?;
                ValueFormat::from_code(code)
                    .ok_or_else(|| malformed(format!("unknown format code {code}")))
            })
            .collect()
    }

    fn read_target(&mut self) -> ProtocolResult<DescribeTarget> {
        match self.read_u8()? {
            b'S' => Ok(DescribeTarget::Statement),
            b'P' => Ok(DescribeTarget::Portal),
            other => Err(malformed(format!("invalid describe target {other:#04x}"))),
        }
    }
}
