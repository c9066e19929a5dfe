use std::env;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tamp_rs::{Alphabet, Code, Codec, CompressionStats, DigramCodec, HuffmanCodec, LzwCodec};

/// Trains every codec on a corpus directory and round-trips one file through storage.
///
/// Usage: cargo run --example tamp <corpus-dir> <filename>
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <corpus-dir> <filename>", args[0]);
        std::process::exit(1);
    }

    let corpus = read_corpus(Path::new(&args[1])).unwrap_or_else(|err| {
        eprintln!("Cannot read corpus \"{}\": {}", args[1], err);
        std::process::exit(1);
    });

    let filename = &args[2];
    let source = fs::read_to_string(filename).unwrap_or_else(|_| {
        eprintln!("File \"{}\" not found.", filename);
        std::process::exit(1);
    });

    let alphabet = Alphabet::printable_ascii();
    let codecs: Vec<(&str, Box<dyn Codec>)> = vec![
        (
            "digram",
            Box::new(DigramCodec::train(alphabet.clone(), &corpus, 256).expect("valid digram size"))
                as Box<dyn Codec>,
        ),
        (
            "huffman",
            Box::new(HuffmanCodec::train(alphabet.clone(), &corpus).expect("non-empty alphabet")),
        ),
        (
            "lzw",
            Box::new(LzwCodec::new(alphabet, 12, 1.0).expect("valid lzw widths")),
        ),
    ];

    for (extension, codec) in &codecs {
        if let Err(err) = run(filename, extension, &**codec, &source) {
            eprintln!("{}: {}", extension, err);
        }
    }
}

/// Concatenates every file in `directory`.
fn read_corpus(directory: &Path) -> std::io::Result<String> {
    let mut entries: Vec<_> = fs::read_dir(directory)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|entry| entry.path());

    let mut corpus = String::new();
    for entry in entries {
        if entry.file_type()?.is_file() {
            corpus.push_str(&fs::read_to_string(entry.path())?);
        }
    }
    Ok(corpus)
}

fn run(
    filename: &str,
    extension: &str,
    codec: &dyn Codec,
    source: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let code = codec.encode(source)?;
    let encode_time = start.elapsed();

    // Round-trip through the padded byte format
    let path = format!("{}.{}", filename, extension);
    fs::write(&path, code.to_bytes())?;
    let stored = Code::from_bytes(&fs::read(&path)?);

    let start = Instant::now();
    let decoded = codec.decode(&stored)?;
    let decode_time = start.elapsed();

    let stats = CompressionStats::measure(source, &code);

    println!("\n=== {} ===", extension.to_uppercase());
    println!("Written to: {}", path);
    println!("Compression time: {:.3} ms", encode_time.as_secs_f64() * 1000.0);
    println!("Decompression time: {:.3} ms", decode_time.as_secs_f64() * 1000.0);
    println!("Compressed bits: {}", stats.code_bits);
    println!("Bits per symbol: {:.3}", stats.bits_per_symbol());
    println!("Compression ratio: {:.3}", stats.compression_ratio());
    if decoded != source {
        println!("Warning: decoded text differs from the source");
    }

    Ok(())
}
