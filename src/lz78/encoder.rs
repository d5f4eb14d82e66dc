//! Encoder-side dictionary and state machine.
//!
//! Mirrors `ht_dictionary_update`/`compress_byte` from the original LZ78
//! implementation: a hash-addressed trie keyed on `(parent, label)` pairs,
//! linear-probed on collision, with a companion "warm" dictionary that is
//! populated in parallel once the primary crosses `SECONDARY_THRESHOLD` so
//! there is no cold restart when the primary fills and rotates out.

use super::{bitlen, DICT_CODE_EOF, DICT_CODE_START, DICT_CODE_STOP, DICT_SIZE_MAX, DICT_SIZE_MIN};
use crate::Error;

#[derive(Clone, Copy, Default)]
struct HtEntry {
    used: bool,
    parent: u32,
    label: u32,
    child: u32,
}

/// Sentinel for "no current node" (the C implementation stores this as
/// `(uint32_t)-1` in a `uint32_t cur_node` field).
const NODE_EMPTY: u32 = u32::MAX;

pub(super) struct HtDictionary {
    root: Vec<HtEntry>,
    cur_node: u32,
    prev_node: u32,
    d_size: u32,
    d_thr: u32,
    d_next: u32,
}

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

    /// Returns `true` when a new entry was created (caller must emit
    /// `prev_node`), `false` when the current match was merely extended or
    /// this was the first symbol after a reset (`cur_node` was empty).
    fn update(&mut self, label: u32) -> bool {
        self.prev_node = self.cur_node;
        if self.cur_node == NODE_EMPTY {
            self.cur_node = label;
            return false;
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
                return false;
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
        true
    }
}

/// Streaming LZ78 encoder. One `step` call consumes one input byte (or the
/// end-of-input signal) and produces at most one `(code, width)` emission.
pub struct Encoder {
    main: HtDictionary,
    secondary: HtDictionary,
    d_size: u32,
    completed: bool,
}

impl Encoder {
    /// `d_size` must already be clamped to `[DICT_SIZE_MIN+1, DICT_SIZE_MAX]`.
    /// Returns the encoder plus the very first emission (`DICT_CODE_START`
    /// at the fixed bootstrap width) the caller must write before the first
    /// call to `step`.
    pub fn new(d_size: u32) -> Result<(Self, (u32, u32)), Error> {
        if d_size < DICT_SIZE_MIN + 1 || d_size > DICT_SIZE_MAX {
            return Err(Error::Dictionary { min: DICT_SIZE_MIN + 1, max: DICT_SIZE_MAX });
        }
        let mut main = HtDictionary::new(d_size);
        let secondary = HtDictionary::new(d_size);
        main.cur_node = DICT_CODE_START;
        let enc = Encoder { main, secondary, d_size, completed: false };
        Ok((enc, (DICT_CODE_START, bitlen(DICT_SIZE_MIN))))
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// `byte_in = None` signals end of input; the caller keeps calling
    /// `step(None)` until `completed()` returns true (mirrors the original
    /// driver, which keeps calling on repeated `EOF` from `fgetc`).
    pub fn step(&mut self, byte_in: Option<u8>) -> Option<(u32, u32)> {
        match self.main.cur_node {
            DICT_CODE_START => {
                let emission = (self.d_size, bitlen(DICT_SIZE_MAX));
                self.main.cur_node = NODE_EMPTY;
                self.process_byte(byte_in);
                Some(emission)
            }
            DICT_CODE_EOF => {
                let emission = (DICT_CODE_EOF, bitlen(self.main.d_next));
                self.main.cur_node = DICT_CODE_STOP;
                Some(emission)
            }
            DICT_CODE_STOP => {
                self.completed = true;
                None
            }
            _ => self.process_byte(byte_in),
        }
    }

    fn process_byte(&mut self, byte_in: Option<u8>) -> Option<(u32, u32)> {
        let c_in = match byte_in {
            Some(b) => b as u32,
            None => DICT_CODE_EOF,
        };
        if !self.main.update(c_in) {
            if self.main.d_next >= self.main.d_thr {
                self.secondary.update(c_in);
            }
            return None;
        }
        let code = self.main.prev_node;
        let width = bitlen(self.main.d_next - 1);
        log::trace!("emit code {} width {}", code, width);
        if self.main.d_next == self.main.d_size {
            log::debug!("encoder dictionary full at {}, rotating", self.main.d_size);
            std::mem::swap(&mut self.main, &mut self.secondary);
            self.main.cur_node = c_in;
            self.secondary.reset();
        }
        if self.main.d_next >= self.main.d_thr {
            self.secondary.update(c_in);
        }
        Some((code, width))
    }
}
