//! Decoder-side dictionary and state machine.
//!
//! Mirrors `dictionary_update`/`decompress_code` from the original LZ78
//! implementation. The decoder's dictionary stores `(parent, label)` pairs
//! indexed directly by code value; decoding a code means walking parent
//! links backward into a scratch buffer, then reversing. The last character
//! of a freshly-inserted entry is not known until the *next* code arrives
//! (it is always the first byte of whatever phrase follows), so every
//! `update` call also backfills the previous entry's label.

use super::{
    bitlen, DICT_CODE_EOF, DICT_CODE_SIZE, DICT_CODE_START, DICT_SIZE_MAX, DICT_SIZE_MIN,
};
use crate::Error;

#[derive(Clone, Copy, Default)]
struct HtEntry {
    used: bool,
    parent: u32,
    label: u32,
    child: u32,
}

/// The decoder's own copy of the encoder's hash-addressed trie, kept so the
/// secondary (warm) dictionary can be populated from decoded bytes and
/// later folded into the primary on rotation, exactly mirroring the
/// encoder's dual-dictionary scheme.
pub(super) struct HtDictionary {
    root: Vec<HtEntry>,
    cur_node: u32,
    prev_node: u32,
    d_size: u32,
    d_thr: u32,
    pub(super) d_next: u32,
}

const NODE_EMPTY: u32 = u32::MAX;

impl HtDictionary {
    fn new(d_size: u32) -> Self {
        HtDictionary {
            root: vec![HtEntry::default(); d_size as usize],
            cur_node: NODE_EMPTY,
            prev_node: 0,
            d_size,
            d_thr: d_size * 8 / 10,
            d_next: DICT_SIZE_MIN,
        }
    }

    fn reset(&mut self) {
        self.root.iter_mut().for_each(|e| *e = HtEntry::default());
        self.d_next = DICT_SIZE_MIN;
        self.cur_node = NODE_EMPTY;
    }

    fn update(&mut self, label: u32) {
        self.prev_node = self.cur_node;
        if self.cur_node == NODE_EMPTY {
            self.cur_node = label;
            return;
        }
        let key = label.wrapping_shl(bitlen(self.d_size)).wrapping_add(self.cur_node);
        let mut hash: u32 = 0;
        let mut key = key;
        for _ in 0..4 {
            hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(key & 0xFF);
            key >>= 8;
        }
        hash %= self.d_size;
        loop {
            let entry = self.root[hash as usize];
            if !entry.used {
                break;
            }
            if entry.parent == self.cur_node && entry.label == label {
                self.cur_node = entry.child;
                return;
            }
            hash = (hash + 1) % self.d_size;
        }
        self.root[hash as usize] = HtEntry {
            used: true,
            parent: self.prev_node,
            label,
            child: self.d_next,
        };
        self.cur_node = label;
        self.d_next += 1;
    }
}

#[derive(Clone, Copy, Default)]
struct DecEntry {
    parent: u32,
    label: u32,
}

/// The decoder's primary dictionary: a flat table of `(parent, label)`
/// pairs plus a scratch buffer used to reconstruct a phrase by walking
/// parent links backward then reading the result forward.
pub(super) struct Dictionary {
    root: Vec<DecEntry>,
    d_size: u32,
    d_thr: u32,
    pub(super) d_min: u32,
    pub(super) d_next: u32,
    bytebuf: Vec<u8>,
    offset: u32,
    n_bytes: u32,
}

impl Dictionary {
    fn new(d_size: u32) -> Self {
        let mut root = vec![DecEntry::default(); d_size as usize];
        for (i, entry) in root.iter_mut().take(DICT_SIZE_MIN as usize).enumerate() {
            entry.parent = 0;
            entry.label = i as u32;
        }
        Dictionary {
            root,
            d_size,
            d_thr: d_size * 8 / 10,
            d_min: DICT_SIZE_MIN,
            d_next: DICT_SIZE_MIN,
            bytebuf: vec![0u8; d_size as usize],
            offset: 0,
            n_bytes: 0,
        }
    }

    fn reset(&mut self) {
        self.d_min = DICT_SIZE_MIN;
        self.d_next = DICT_SIZE_MIN;
    }

    /// Reconstructs the phrase for `code`, backfills the previous entry's
    /// deferred label, and records a fresh (still label-less) entry for
    /// `code` itself.
    fn update(&mut self, code: u32) -> Result<(), Error> {
        if code >= self.d_next {
            return Err(Error::Decompress);
        }
        let top = self.d_size - 1;
        let mut i = top;
        let mut p = code;
        loop {
            self.bytebuf[i as usize] = self.root[p as usize].label as u8;
            let prev_p = p;
            if i == 0 {
                break;
            }
            i -= 1;
            if prev_p < DICT_SIZE_MIN {
                break;
            }
            p = self.root[prev_p as usize].parent;
        }

        // KwKwK: code refers to the entry currently being completed, whose
        // last byte is not yet known; it is always the phrase's own first
        // byte (bytebuf[i+1]).
        if code >= self.d_min && code == self.d_next - 1 {
            self.bytebuf[top as usize] = self.bytebuf[(i + 1) as usize];
        }
        // Deferred label fill: the entry inserted on the previous call
        // couldn't know its last byte until this call decoded the phrase
        // that follows it.
        if self.d_next > self.d_min {
            self.root[(self.d_next - 1) as usize].label = self.bytebuf[(i + 1) as usize] as u32;
        }

        self.n_bytes = top - i;
        self.offset = top + 1 - self.n_bytes;
        self.root[self.d_next as usize].parent = code;
        self.d_next += 1;
        Ok(())
    }
}

/// Streaming LZ78 decoder. One `submit` call consumes one code and makes
/// any decoded bytes available through `take_output` on the *next* call,
/// one call behind, matching the original driver's buffering.
pub struct Decoder {
    main: Dictionary,
    secondary: Option<HtDictionary>,
    completed: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            main: Dictionary::new(DICT_SIZE_MIN),
            secondary: None,
            completed: false,
        }
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Bit width the driver should read the *next* code at.
    pub fn next_width(&self) -> u32 {
        bitlen(self.main.d_next)
    }

    /// Bytes produced by the previous `submit` call. Empty until the first
    /// real code has been decoded.
    pub fn take_output(&self) -> &[u8] {
        &self.main.bytebuf[self.main.offset as usize..(self.main.offset + self.main.n_bytes) as usize]
    }

    pub fn submit(&mut self, code: u32) -> Result<(), Error> {
        match code {
            DICT_CODE_EOF => {
                self.completed = true;
                return Ok(());
            }
            DICT_CODE_START | DICT_CODE_SIZE => {
                // Arm the bootstrap: the next code carries the real dictionary size.
                self.main.d_next = DICT_SIZE_MAX;
                return Ok(());
            }
            _ => {}
        }

        if self.main.d_next == DICT_SIZE_MAX {
            if code <= DICT_SIZE_MIN || code > DICT_SIZE_MAX {
                return Err(Error::Decompress);
            }
            log::debug!("bootstrapping decoder dictionaries at size {}", code);
            self.main = Dictionary::new(code);
            self.secondary = Some(HtDictionary::new(code));
            return Ok(());
        }

        let Some(secondary) = self.secondary.as_mut() else {
            return Err(Error::Decompress);
        };

        self.main.update(code)?;

        if self.main.d_next > self.main.d_thr {
            for i in 0..self.main.n_bytes {
                let c_in = self.main.bytebuf[(self.main.offset + i) as usize] as u32;
                secondary.update(c_in);
            }
        }

        if self.main.d_next == self.main.d_size {
            log::debug!("decoder dictionary full at {}, rotating", self.main.d_size);
            self.main.reset();
            self.main.d_min = secondary.d_next;
            self.main.d_next = secondary.d_next;
            for i in 0..secondary.d_size {
                let entry = secondary.root[i as usize];
                if entry.used {
                    self.main.root[entry.child as usize] = DecEntry { parent: entry.parent, label: entry.label };
                    secondary.d_next -= 1;
                }
            }
            secondary.reset();
        }
        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
