use crate::McsErr;
use std::io::{Read, Write};

const SEGMENT_BITS: u32 = 0x7F;
const CHECKER_BIT: u8 = 0x80;

/// A VarInt never takes more than 10 bytes on the wire, even though only
/// the low 32 bits of the decoded value are kept.
pub const MAX_VARINT_LEN: usize = 10;
/// Largest `total_length` accepted when reading a packet.
pub const MAX_PACKET_LEN: i32 = 32768;

/// Encode the given number as a [VarInt](https://wiki.vg/Protocol#VarInt_and_VarLong).
pub fn encode_varint(num: i32) -> Vec<u8> {
    // Negative values are encoded through their two's complement
    // representation, so they always use the maximum 5 bytes.
    let mut num = num as u32;
    let mut result = Vec::<u8>::new();

    loop {
        if (num & (!SEGMENT_BITS)) == 0 {
            result.push(num as u8);

            return result;
        }

        result.push(((num & SEGMENT_BITS) as u8) | CHECKER_BIT);
        num >>= 7;
    }
}

/// Decode a VarInt from the reader, returning `(bytes_consumed, value)`.
///
/// The value is accumulated as an unsigned 64-bit number, then narrowed to
/// 32 bits and reinterpreted as signed. Anything at or above `2^31`
/// therefore comes back negative, which is what servers expect.
pub fn decode_varint<R: Read>(reader: &mut R) -> Result<(usize, i32), McsErr> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut buf = [0u8; 1];

    for i in 0..MAX_VARINT_LEN {
        reader.read_exact(&mut buf)?;

        let n = buf[0];

        if n & CHECKER_BIT == 0 {
            if i == MAX_VARINT_LEN - 1 && n > 1 {
                return Err(McsErr::FrameErr("VarInt overflows a 64-bit integer".into()));
            }

            result |= (n as u64) << shift;

            return Ok((i + 1, result as u32 as i32));
        }

        result |= ((n as u32 & SEGMENT_BITS) as u64) << shift;
        shift += 7;
    }

    Err(McsErr::FrameErr(format!(
        "VarInt is longer than {} bytes",
        MAX_VARINT_LEN
    )))
}

/// Build a [packet](https://wiki.vg/Protocol#Packet_format) buffer.
///
/// The leading length counts the encoded packet id plus the payload, not itself.
pub fn encode_packet(id: i32, payload: &[u8]) -> Vec<u8> {
    let mut id_bytes = encode_varint(id);
    let mut packet = encode_varint((id_bytes.len() + payload.len()) as i32);

    packet.append(&mut id_bytes);
    packet.extend_from_slice(payload);

    packet
}

pub fn write_packet<W: Write>(writer: &mut W, id: i32, payload: &[u8]) -> Result<(), McsErr> {
    writer.write_all(&encode_packet(id, payload))?;

    Ok(())
}

/// Read one packet, returning `(packet_id, payload)`.
pub fn read_packet<R: Read>(reader: &mut R) -> Result<(i32, Vec<u8>), McsErr> {
    let (_, packet_len) = decode_varint(reader)?;

    if packet_len < 0 || packet_len > MAX_PACKET_LEN {
        return Err(McsErr::FrameErr(format!(
            "Bad packet length: {}",
            packet_len
        )));
    }

    let (id_len, id) = decode_varint(reader)?;
    let payload_len = packet_len - id_len as i32;

    if payload_len < 0 {
        return Err(McsErr::FrameErr(format!(
            "Bad payload length {} (full packet {})",
            payload_len, packet_len
        )));
    }

    let mut payload = vec![0u8; payload_len as usize];

    reader.read_exact(&mut payload)?;

    Ok((id, payload))
}

/// UTF-8 string prefixed with its size in bytes as a VarInt.
pub fn encode_utf8_str(str: &str) -> Vec<u8> {
    let mut bufs = encode_varint(str.len() as i32);

    bufs.extend_from_slice(str.as_bytes());

    bufs
}

pub fn read_utf8_str<R: Read>(reader: &mut R) -> Result<String, McsErr> {
    let (_, str_len) = decode_varint(reader)?;

    if str_len < 0 {
        return Err(McsErr::FrameErr(format!(
            "String length smaller than 0: {}",
            str_len
        )));
    }

    let mut bufs = vec![0u8; str_len as usize];

    reader.read_exact(&mut bufs)?;

    String::from_utf8(bufs)
        .map_err(|err| McsErr::DataErr(format!("Invalid UTF-8 string: {}", err)))
}
