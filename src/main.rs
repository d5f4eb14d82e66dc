use clap::{arg, crate_version, Command};
use lz78_stream::lz78;

const RCH: &str = "unreachable was reached";

/// Parse a size argument with an optional `K`/`M` suffix (base 1024), e.g.
/// `4096`, `4K`, `1M`.
fn byte_size(s: &str) -> Result<usize, String> {
    let (digits, mult) = match s.chars().last() {
        Some('K') | Some('k') => (&s[..s.len() - 1], 1024),
        Some('M') | Some('m') => (&s[..s.len() - 1], 1024 * 1024),
        _ => (s, 1),
    };
    let n: usize = digits.parse().map_err(|_| format!("not a number: {}", s))?;
    Ok(n * mult)
}

fn main() -> lz78_stream::STDRESULT {
    env_logger::init();

    let long_help = "Examples:
---------
Compress:  `lz78-stream -i plain.txt -o plain.lz78`
Expand:    `lz78-stream -d -i plain.lz78 -o plain.txt`";

    let main_cmd = Command::new("lz78-stream")
        .about("Streaming LZ78 compressor/expander")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(-i --input <PATH> "input path (defaults to stdin)"))
        .arg(arg!(-o --output <PATH> "output path (defaults to stdout)"))
        .arg(arg!(-d --decompress "decompress instead of compress"))
        .arg(arg!(-t --type <TYPE> "compression algorithm").default_value("lz78"))
        .arg(arg!(-b --bsize <SIZE> "I/O buffer size, accepts K/M suffix").default_value("1M"))
        .arg(arg!(-a --additional <SIZE> "dictionary size, accepts K/M suffix").default_value("4096"));

    let matches = main_cmd.get_matches();

    let path_in = matches.get_one::<String>("input");
    let path_out = matches.get_one::<String>("output");
    let decompress = matches.get_flag("decompress");
    let method = matches.get_one::<String>("type").expect(RCH);
    let bsize = byte_size(matches.get_one::<String>("bsize").expect(RCH))?;
    let dict_size = byte_size(matches.get_one::<String>("additional").expect(RCH))? as u32;

    if method != "lz78" {
        return Err(Box::new(lz78_stream::Error::Mode));
    }
    if bsize == 0 || bsize % 8 != 0 {
        return Err(Box::new(lz78_stream::Error::Initialization));
    }

    let mut input: Box<dyn std::io::Read> = match path_in {
        Some(p) => Box::new(std::fs::File::open(p)?),
        None => Box::new(std::io::stdin()),
    };
    let mut output: Box<dyn std::io::Write> = match path_out {
        Some(p) => Box::new(std::fs::File::create(p)?),
        None => Box::new(std::io::stdout()),
    };

    let (in_count, out_count) = if decompress {
        lz78::expand_buffered(&mut input, &mut output, bsize * 8)?
    } else {
        lz78::compress_buffered(&mut input, &mut output, dict_size, bsize * 8)?
    };
    log::info!("processed {} bytes into {} bytes", in_count, out_count);

    Ok(())
}
