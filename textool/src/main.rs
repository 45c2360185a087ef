use std::{error::Error, fs::File, path::PathBuf, process::ExitCode, time::Instant};

use ddsfile::{AlphaMode, D3D10ResourceDimension, Dds, DxgiFormat, NewDxgiParams};
use image::ImageReader;
use textoolwrap::{
    codec::{self, VariableCodec},
    format::mode,
    BlockCodec, BlockSettings, CompressorQuality, CrunchCodec, CrunchSettings, MipMode,
    TranscodeSettings, Transcoder,
};

#[derive(Copy, Clone, Debug)]
enum Entry {
    Transcode,
    Block,
    Crunch,
}

struct Args {
    entry: Entry,
    mode: i32,
    file_name: String,
    level: i32,
    mips: i32,
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = parse_args() else {
        return ExitCode::FAILURE;
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();

    let image = ImageReader::open(&args.file_name)?.decode()?.to_rgba8();
    let (width, height) = image.dimensions();

    println!(
        "Image read took: {:.3} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    let start = Instant::now();

    let encoded = match args.entry {
        Entry::Transcode => {
            let transcoder = Transcoder::new(
                TranscodeSettings::new().with_quality(CompressorQuality::from_level(args.level)),
            );
            let mut encoded = vec![0u8; codec::encoded_size(&transcoder, args.mode, width, height)?];
            codec::encode_fixed(&transcoder, args.mode, &image, &mut encoded, width, height)?;
            encoded
        }
        Entry::Block => {
            let block_codec = BlockCodec::new(BlockSettings::from_level(args.level));
            let mut encoded = vec![0u8; codec::encoded_size(&block_codec, args.mode, width, height)?];
            codec::encode_fixed(&block_codec, args.mode, &image, &mut encoded, width, height)?;
            encoded
        }
        Entry::Crunch => {
            let crunch_codec = CrunchCodec::new(
                CrunchSettings::new()
                    .with_level(args.level)
                    .with_mips(MipMode::from_count(args.mips)),
            );
            let format = crunch_codec.resolve(args.mode)?;
            crunch_codec.encode(format, &image, width, height)?
        }
    };

    println!(
        "Encoding {width}x{height} took: {:.3} ms ({} bytes)",
        start.elapsed().as_secs_f64() * 1000.0,
        encoded.len()
    );

    let output = match dxgi_format(args.mode) {
        Some(format) if matches!(args.entry, Entry::Block) => {
            write_dds_file(&args.file_name, format, width, height, encoded)?
        }
        _ => write_raw_file(&args.file_name, args.entry, &encoded)?,
    };

    log::info!("wrote {}", output.display());

    Ok(())
}

fn write_dds_file(
    file_name: &str,
    format: DxgiFormat,
    width: u32,
    height: u32,
    block_data: Vec<u8>,
) -> Result<PathBuf, Box<dyn Error>> {
    let mut dds = Dds::new_dxgi(NewDxgiParams {
        height,
        width,
        depth: None,
        format,
        mipmap_levels: Some(1),
        array_layers: None,
        caps2: None,
        is_cubemap: false,
        resource_dimension: D3D10ResourceDimension::Texture2D,
        alpha_mode: AlphaMode::Straight,
    })?;

    dds.data = block_data;

    let mut dds_name = PathBuf::from(file_name);
    dds_name.set_extension("dds");

    let mut file = File::create(&dds_name)?;
    dds.write(&mut file)?;

    Ok(dds_name)
}

fn write_raw_file(file_name: &str, entry: Entry, data: &[u8]) -> Result<PathBuf, Box<dyn Error>> {
    let mut raw_name = PathBuf::from(file_name);
    raw_name.set_extension(match entry {
        Entry::Crunch => "crn",
        _ => "raw",
    });

    std::fs::write(&raw_name, data)?;

    Ok(raw_name)
}

fn dxgi_format(mode_code: i32) -> Option<DxgiFormat> {
    match mode_code {
        mode::DXT1 => Some(DxgiFormat::BC1_UNorm_sRGB),
        mode::DXT5 => Some(DxgiFormat::BC3_UNorm_sRGB),
        mode::BC4 => Some(DxgiFormat::BC4_UNorm),
        mode::BC5 => Some(DxgiFormat::BC5_UNorm),
        mode::BC7 => Some(DxgiFormat::BC7_UNorm_sRGB),
        _ => None,
    }
}

fn print_help() {
    println!("Usage: textool <entry> <mode> <input_file> [level] [mips]");
    println!("\nEntries:");
    println!("  pvr    - fixed-format transcode (uncompressed, ETC1/ETC2/EAC)");
    println!("  ispc   - block compression (BC1/BC3/BC4/BC5/BC7), written as DDS");
    println!("  crunch - crunched container with mip chain");
    println!("\nMode is the numeric engine texture format code, e.g.");
    println!("  10 DXT1, 12 DXT5, 25 BC7, 34 ETC_RGB4, 47 ETC2_RGBA8, 28 DXT1Crunched");
    println!("\nLevel defaults to 5 (100 for crunch), mips to 1.");
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = std::env::args().collect();

    if !(4..=6).contains(&args.len()) || args.contains(&"--help".to_string()) {
        print_help();
        return None;
    }

    let entry = match args[1].to_lowercase().as_str() {
        "pvr" => Entry::Transcode,
        "ispc" => Entry::Block,
        "crunch" => Entry::Crunch,
        _ => {
            println!("Error: Invalid entry");
            print_help();
            return None;
        }
    };

    let Ok(mode) = args[2].parse() else {
        println!("Error: Mode must be an integer");
        print_help();
        return None;
    };

    let default_level = match entry {
        Entry::Crunch => 100,
        _ => 5,
    };
    let level = match args.get(4).map(|level| level.parse()) {
        None => default_level,
        Some(Ok(level)) => level,
        Some(Err(_)) => {
            println!("Error: Level must be an integer");
            return None;
        }
    };
    let mips = match args.get(5).map(|mips| mips.parse()) {
        None => 1,
        Some(Ok(mips)) => mips,
        Some(Err(_)) => {
            println!("Error: Mips must be an integer");
            return None;
        }
    };

    Some(Args {
        entry,
        mode,
        file_name: args[3].clone(),
        level,
        mips,
    })
}
