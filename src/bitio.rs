//! Bit-granular stream reader/writer
//!
//! A small ring buffer sits between the byte-oriented `Read`/`Write` the
//! caller gives us and the bit-oriented `read_bits`/`write_bits` the codec
//! needs. Bits are packed least-significant-bit first within each byte,
//! matching the wire format's little-endian convention (see `lz78::constants`).
//!
//! Non-blocking sources/sinks are supported: a `WouldBlock` from the
//! underlying `Read`/`Write` is not an error here, it just means fewer bits
//! than requested were moved. The caller compares the returned count against
//! what it asked for to decide whether to retry.

use std::io::{self, Read, Write};

use crate::Error;

/// Buffered bit writer over an underlying byte sink.
pub struct BitWriter<W: Write> {
    inner: W,
    capacity_bits: usize,
    buf: Vec<u8>,
    w_start: usize,
    w_len: usize,
}

impl<W: Write> BitWriter<W> {
    /// `buffer_bits` must be a non-zero multiple of 8.
    pub fn new(inner: W, buffer_bits: usize) -> Result<Self, Error> {
        if buffer_bits == 0 || buffer_bits % 8 != 0 {
            return Err(Error::Initialization);
        }
        Ok(Self {
            inner,
            capacity_bits: buffer_bits,
            buf: vec![0u8; buffer_bits / 8],
            w_start: 0,
            w_len: 0,
        })
    }

    /// Write the low `n_bits` of `value`, LSB first. Returns the number of
    /// bits actually buffered/written; this is less than `n_bits` only when
    /// the underlying writer reports `WouldBlock` while the ring is full.
    pub fn write_bits(&mut self, mut value: u32, n_bits: u32) -> io::Result<u32> {
        let mut written = 0u32;
        let mut remaining = n_bits;
        while remaining > 0 {
            if self.w_len == self.capacity_bits {
                let before = self.w_len;
                self.flush()?;
                if self.w_len == before {
                    break;
                }
            }
            let pos = (self.w_start + self.w_len) % self.capacity_bits;
            let byte_idx = pos / 8;
            let bit_idx = pos % 8;
            if value & 1 == 1 {
                self.buf[byte_idx] |= 1 << bit_idx;
            } else {
                self.buf[byte_idx] &= !(1 << bit_idx);
            }
            value >>= 1;
            self.w_len += 1;
            remaining -= 1;
            written += 1;
        }
        Ok(written)
    }

    /// Push whole buffered bytes out to the underlying writer. Sub-byte
    /// residue at the tail is left behind. Returns the number of bits
    /// actually flushed (a multiple of 8).
    pub fn flush(&mut self) -> io::Result<usize> {
        let mut flushed = 0usize;
        while self.w_len >= 8 {
            let byte_idx = self.w_start / 8;
            match self.inner.write(&self.buf[byte_idx..byte_idx + 1]) {
                Ok(0) => break,
                Ok(_) => {
                    self.w_start = (self.w_start + 8) % self.capacity_bits;
                    self.w_len -= 8;
                    flushed += 8;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }
        Ok(flushed)
    }

    /// Pad any sub-byte residue to a whole byte (padding bits are undefined
    /// on read-back, per the wire format), flush everything, and hand back
    /// the underlying writer.
    pub fn close(mut self) -> io::Result<W> {
        if self.w_len % 8 != 0 {
            let pad = 8 - (self.w_len % 8) as u32;
            self.write_bits(0, pad)?;
        }
        loop {
            let before = self.w_len;
            self.flush()?;
            if self.w_len == 0 || self.w_len == before {
                break;
            }
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Buffered bit reader over an underlying byte source.
pub struct BitReader<R: Read> {
    inner: R,
    capacity_bits: usize,
    buf: Vec<u8>,
    w_start: usize,
    w_len: usize,
}

impl<R: Read> BitReader<R> {
    /// `buffer_bits` must be a non-zero multiple of 8.
    pub fn new(inner: R, buffer_bits: usize) -> Result<Self, Error> {
        if buffer_bits == 0 || buffer_bits % 8 != 0 {
            return Err(Error::Initialization);
        }
        Ok(Self {
            inner,
            capacity_bits: buffer_bits,
            buf: vec![0u8; buffer_bits / 8],
            w_start: 0,
            w_len: 0,
        })
    }

    fn refill(&mut self) -> io::Result<usize> {
        if self.w_len == self.capacity_bits {
            return Ok(0);
        }
        let free_pos = (self.w_start + self.w_len) % self.capacity_bits;
        let byte_idx = free_pos / 8;
        let mut tmp = [0u8; 1];
        match self.inner.read(&mut tmp) {
            Ok(0) => Ok(0),
            Ok(_) => {
                self.buf[byte_idx] = tmp[0];
                self.w_len += 8;
                Ok(8)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Read up to `n_bits` into the low bits of the return value, LSB first.
    /// Returns `(value, bits_read)`; `bits_read < n_bits` means either the
    /// source is exhausted or a retry is needed, which the caller
    /// distinguishes by trying again and seeing whether progress resumes.
    pub fn read_bits(&mut self, n_bits: u32) -> io::Result<(u32, u32)> {
        let mut value: u32 = 0;
        let mut got = 0u32;
        while got < n_bits {
            if self.w_len == 0 && self.refill()? == 0 {
                break;
            }
            let pos = self.w_start;
            let byte_idx = pos / 8;
            let bit_idx = pos % 8;
            let bit = (self.buf[byte_idx] >> bit_idx) & 1;
            value |= (bit as u32) << got;
            self.w_start = (self.w_start + 1) % self.capacity_bits;
            self.w_len -= 1;
            got += 1;
        }
        Ok((value, got))
    }
}
