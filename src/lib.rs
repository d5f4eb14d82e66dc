//! # lz78-stream
//!
//! A streaming LZ78 compressor/expander with a variable-width bit-packed
//! wire format and a dual-dictionary rotation scheme, so that both the
//! encoder and decoder can keep adapting to the input without ever growing
//! their dictionaries without bound.
//!
//! The codec state machines in [`lz78`] operate one byte (encoder) or one
//! code (decoder) at a time, so they are naturally streamable; [`lz78::compress`]
//! and [`lz78::expand`] are the buffered drivers that sit on top, generic
//! over `Read`/`Write`.
//!
//! ## File Example
//!
//! ```rs
//! use lz78_stream::*;
//! let mut in_file = std::fs::File::open("some_input_path").expect("open failed");
//! let mut out_file = std::fs::File::create("some_output_path").expect("create failed");
//! let (in_size,out_size) = lz78::compress(&mut in_file,&mut out_file,lz78::DICT_SIZE_DEFAULT)
//!     .expect("compression failed");
//! eprintln!("compressed {} into {}",in_size,out_size);
//! ```
//!
//! ## Buffer Example
//!
//! ```rs
//! use lz78_stream::*;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = lz78::compress_slice(test_data,lz78::DICT_SIZE_DEFAULT).expect("compression failed");
//! ```

pub mod bitio;
pub mod lz78;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Crate errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("invalid initialization parameters")]
    Initialization,
    #[error("dictionary size must be in [{min}, {max}]")]
    Dictionary { min: u32, max: u32 },
    #[error("malformed compressed stream")]
    Decompress,
    #[error("wrong mode for this operation")]
    Mode
}
