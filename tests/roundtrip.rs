//! End-to-end scenarios from the codec's testable-properties list: S1-S6
//! plus the general round-trip/determinism/boundary properties, driven
//! through the public `compress_slice`/`expand_slice` entry points.

use lz78_stream::lz78::{self, DICT_CODE_EOF, DICT_SIZE_DEFAULT, DICT_SIZE_MAX, DICT_SIZE_MIN};

fn roundtrip(data: &[u8], dict_size: u32) {
    let compressed = lz78::compress_slice(data, dict_size).expect("compress");
    let expanded = lz78::expand_slice(&compressed).expect("expand");
    assert_eq!(expanded, data, "roundtrip mismatch at dict_size {}", dict_size);
}

#[test]
fn s1_run_of_identical_bytes_compresses() {
    let data = b"AAAAAAAAAA";
    let compressed = lz78::compress_slice(data, DICT_SIZE_DEFAULT).expect("compress");
    assert!(compressed.len() < data.len(), "expected shrinkage, got {} bytes", compressed.len());
    let expanded = lz78::expand_slice(&compressed).expect("expand");
    assert_eq!(expanded, data);
}

#[test]
fn s2_alternating_bytes_second_a_is_a_literal() {
    // The dictionary only learns "AB" after the first two bytes, so the
    // second 'A' still has to go out as the literal code 65, not yet as a
    // dictionary backreference.
    let data = b"ABABABABAB";
    roundtrip(data, DICT_SIZE_DEFAULT);

    let mut encoder = lz78::Encoder::new(DICT_SIZE_DEFAULT).expect("new encoder").0;
    let mut codes = Vec::new();
    for &b in data {
        if let Some((code, width)) = encoder.step(Some(b)) {
            codes.push((code, width));
        }
    }
    while !encoder.completed() {
        if let Some(c) = encoder.step(None) {
            codes.push(c);
        }
    }
    // codes[0] is the bootstrap size announcement; the first emitted
    // *data* code is codes[1], which should be the literal 'A' (65).
    assert_eq!(codes[1].0, b'A' as u32);
}

#[test]
fn s3_all_byte_values_emit_256_literals_then_eof() {
    let data: Vec<u8> = (0..=255u8).collect();
    roundtrip(&data, DICT_SIZE_DEFAULT);

    let (mut encoder, _first) = lz78::Encoder::new(DICT_SIZE_DEFAULT).expect("new encoder");
    let mut literal_count = 0;
    let mut saw_eof = false;
    for &b in &data {
        if let Some((code, _)) = encoder.step(Some(b)) {
            if code < 256 {
                literal_count += 1;
            }
        }
    }
    while !encoder.completed() {
        if let Some((code, _)) = encoder.step(None) {
            if code == DICT_CODE_EOF {
                saw_eof = true;
            }
        }
    }
    // every byte is distinct from every other, so the trie never has a
    // chance to extend a match: each byte is its own literal emission.
    assert_eq!(literal_count, 256);
    assert!(saw_eof);
}

#[test]
fn s4_random_bytes_do_not_expand_badly() {
    // a small xorshift PRNG keeps this test deterministic without pulling
    // in a dependency just for fixture generation.
    let mut state: u32 = 0x9e3779b9;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state & 0xFF) as u8
    };
    let data: Vec<u8> = (0..100 * 1024).map(|_| next()).collect();
    let compressed = lz78::compress_slice(&data, DICT_SIZE_DEFAULT).expect("compress");
    let expanded = lz78::expand_slice(&compressed).expect("expand");
    assert_eq!(expanded, data);
    let ratio = compressed.len() as f64 / data.len() as f64;
    assert!(ratio <= 1.25, "incompressible input expanded too much: ratio {}", ratio);
}

#[test]
fn s5_long_repeating_pattern_compresses_substantially() {
    let pattern: Vec<u8> = (0..64u8).collect();
    let mut data = Vec::with_capacity(10 * 1024 * 1024);
    while data.len() < 10 * 1024 * 1024 {
        data.extend_from_slice(&pattern);
    }
    let compressed = lz78::compress_slice(&data, DICT_SIZE_DEFAULT).expect("compress");
    let expanded = lz78::expand_slice(&compressed).expect("expand");
    assert_eq!(expanded, data);
    assert!(
        (compressed.len() as f64) < 0.10 * (data.len() as f64),
        "expected < 10% of original, got {} of {}",
        compressed.len(),
        data.len()
    );
}

#[test]
fn s6_kwkwk_stressor_round_trips() {
    // a run longer than the dictionary forces repeated self-referential
    // (code == d_next - 1) decodes, which is the KwKwK corner case.
    let dict_size = DICT_SIZE_MIN + 64;
    let data = vec![b'a'; (dict_size as usize) * 3];
    roundtrip(&data, dict_size);
}

#[test]
fn empty_input_round_trips_to_empty_output() {
    let compressed = lz78::compress_slice(b"", DICT_SIZE_DEFAULT).expect("compress");
    let expanded = lz78::expand_slice(&compressed).expect("expand");
    assert!(expanded.is_empty());
}

#[test]
fn determinism_across_runs() {
    let data = b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly";
    let first = lz78::compress_slice(data, DICT_SIZE_DEFAULT).expect("compress");
    let second = lz78::compress_slice(data, DICT_SIZE_DEFAULT).expect("compress");
    assert_eq!(first, second);
}

#[test]
fn boundary_smallest_legal_dictionary_round_trips() {
    let data = b"mnemonic mnemonic mnemonic device device device";
    roundtrip(data, DICT_SIZE_MIN + 1);
}

#[test]
fn boundary_largest_legal_dictionary_round_trips() {
    let data = b"a modestly sized phrase repeated for a little bit of dictionary traffic";
    roundtrip(data, DICT_SIZE_MAX);
}

#[test]
fn round_trip_holds_across_a_spread_of_dictionary_sizes() {
    let data = "she sells seashells by the seashore, and the shells she sells are seashells, surely"
        .repeat(20)
        .into_bytes();
    for dict_size in [DICT_SIZE_MIN + 1, 300, 1024, DICT_SIZE_DEFAULT, 20_000] {
        roundtrip(&data, dict_size);
    }
}
