//! Streaming LZ78 compression with a variable-width bit-packed wire format
//! and a dual-dictionary rotation scheme.
//!
//! The wire format is a sequence of LSB-first bit-packed codes:
//! `DICT_CODE_START`, the negotiated dictionary size, then a stream of
//! literal/backreference codes whose width grows with the dictionary
//! (see [`bitlen`]), terminated by `DICT_CODE_EOF`.
//!
//! [`Encoder`] and [`Decoder`] are the bare state machines, one byte/code
//! at a time; [`compress`]/[`expand`] are the buffered drivers built on top
//! of [`crate::bitio`].

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use std::io::{self, Cursor, Read, Write};

use crate::bitio::{BitReader, BitWriter};

/// Smallest legal dictionary size; the first `DICT_SIZE_MIN` codes are
/// reserved for single-byte literals plus the four control codes.
pub const DICT_SIZE_MIN: u32 = 260;
/// Dictionary size used when the caller doesn't specify one.
pub const DICT_SIZE_DEFAULT: u32 = 4096;
/// Largest legal dictionary size.
pub const DICT_SIZE_MAX: u32 = 1_048_576;

/// End-of-input marker.
pub const DICT_CODE_EOF: u32 = 256;
/// Reserved; accepted by the decoder for protocol symmetry but never sent
/// by this encoder, which always negotiates size via `DICT_CODE_START`.
pub const DICT_CODE_SIZE: u32 = 257;
/// Sent once at the very start of a stream, followed by the dictionary size.
pub const DICT_CODE_START: u32 = 258;
/// Internal-only sentinel the encoder uses to mark "fully drained" after
/// emitting `DICT_CODE_EOF`; never appears on the wire.
pub const DICT_CODE_STOP: u32 = 259;

/// Bits needed to represent `i`, i.e. `ceil(log2(i+1))` with `bitlen(0) == 0`.
pub fn bitlen(mut i: u32) -> u32 {
    let mut n = 0;
    while i != 0 {
        n += 1;
        i >>= 1;
    }
    n
}

/// Default size of the bitio ring buffer used by the drivers below, in
/// bits (matches the original's `B_SIZE_DEFAULT` of 1 MiB, expressed in
/// bits since `bitio` works in bit units).
pub const BIT_BUFFER_BITS: usize = 1 << 20;

/// Clamp a requested dictionary size into `[DICT_SIZE_MIN+1, DICT_SIZE_MAX]`,
/// matching the original implementation's `DICT_LIMIT` macro. Library
/// entry points apply this clamp; the lower-level `Encoder::new`/`Decoder`
/// bootstrap instead reject out-of-range sizes explicitly.
pub fn clamp_dict_size(requested: u32) -> u32 {
    if requested < DICT_SIZE_MIN + 1 {
        DICT_SIZE_MIN + 1
    } else if requested > DICT_SIZE_MAX {
        DICT_SIZE_MAX
    } else {
        requested
    }
}

fn emit_code<W: Write>(writer: &mut BitWriter<W>, code: u32, width: u32, out_bits: &mut u64) -> Result<(), crate::DYNERR> {
    let mut remaining = width;
    let mut value = code;
    while remaining > 0 {
        let wrote = writer.write_bits(value, remaining)?;
        if wrote == 0 {
            return Err(Box::new(io::Error::new(io::ErrorKind::WouldBlock, "sink stalled mid-code")));
        }
        value >>= wrote;
        remaining -= wrote;
        *out_bits += wrote as u64;
    }
    Ok(())
}

/// Compress `input` into `output`, returning `(bytes_read, bytes_written)`.
pub fn compress<R: Read, W: Write>(input: &mut R, output: &mut W, dict_size: u32) -> Result<(u64, u64), crate::DYNERR> {
    compress_buffered(input, output, dict_size, BIT_BUFFER_BITS)
}

/// Like [`compress`], but with an explicit bitio ring buffer size (bits).
pub fn compress_buffered<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    dict_size: u32,
    buffer_bits: usize,
) -> Result<(u64, u64), crate::DYNERR> {
    let dict_size = clamp_dict_size(dict_size);
    let (mut encoder, first) = Encoder::new(dict_size)?;
    let mut writer = BitWriter::new(&mut *output, buffer_bits)?;

    let mut in_count: u64 = 0;
    let mut out_bits: u64 = 0;

    emit_code(&mut writer, first.0, first.1, &mut out_bits)?;

    let mut byte = [0u8; 1];
    loop {
        let n = input.read(&mut byte)?;
        let next_byte = if n == 0 { None } else { Some(byte[0]) };
        if n > 0 {
            in_count += 1;
        }
        if let Some((code, width)) = encoder.step(next_byte) {
            emit_code(&mut writer, code, width, &mut out_bits)?;
        }
        if encoder.completed() {
            break;
        }
        // otherwise keep going: on EOF the encoder still needs to be fed
        // a couple more times to finish its shutdown handshake
    }
    writer.close()?;
    Ok((in_count, out_bits / 8 + if out_bits % 8 != 0 { 1 } else { 0 }))
}

/// Expand `input` into `output`, returning `(bytes_read, bytes_written)`.
pub fn expand<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<(u64, u64), crate::DYNERR> {
    expand_buffered(input, output, BIT_BUFFER_BITS)
}

/// Like [`expand`], but with an explicit bitio ring buffer size (bits).
pub fn expand_buffered<R: Read, W: Write>(input: &mut R, output: &mut W, buffer_bits: usize) -> Result<(u64, u64), crate::DYNERR> {
    let mut reader = BitReader::new(&mut *input, buffer_bits)?;
    let mut decoder = Decoder::new();

    let mut in_bits: u64 = 0;
    let mut out_count: u64 = 0;

    loop {
        let out = decoder.take_output();
        if !out.is_empty() {
            output.write_all(out)?;
            out_count += out.len() as u64;
        }

        let width = decoder.next_width();
        let mut value: u32 = 0;
        let mut got = 0u32;
        while got < width {
            let (chunk, n) = reader.read_bits(width - got)?;
            if n == 0 {
                return Err(Box::new(io::Error::new(io::ErrorKind::WouldBlock, "source stalled mid-code")));
            }
            value |= chunk << got;
            got += n;
            in_bits += n as u64;
        }

        decoder.submit(value)?;
        if decoder.completed() {
            break;
        }
    }
    Ok((in_bits / 8, out_count))
}

/// Compress a byte slice, returning the compressed buffer.
pub fn compress_slice(data: &[u8], dict_size: u32) -> Result<Vec<u8>, crate::DYNERR> {
    let mut input = Cursor::new(data);
    let mut output = Cursor::new(Vec::new());
    compress(&mut input, &mut output, dict_size)?;
    Ok(output.into_inner())
}

/// Expand a byte slice, returning the expanded buffer.
pub fn expand_slice(data: &[u8]) -> Result<Vec<u8>, crate::DYNERR> {
    let mut input = Cursor::new(data);
    let mut output = Cursor::new(Vec::new());
    expand(&mut input, &mut output)?;
    Ok(output.into_inner())
}
