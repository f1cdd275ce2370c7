//! Veles CLI - Command-line tool for Enshrouded KFC2 archive extraction.
//!
//! This is the main entry point for the Veles command-line application.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use veles::prelude::*;
use veles::reflection::schema;

/// Veles - Enshrouded KFC2 archive extraction tool
#[derive(Parser)]
#[command(name = "veles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about a KFC2 archive
    Info {
        /// Path to the .kfc file
        #[arg(short, long, env = "INPUT_KFC")]
        input: PathBuf,
    },

    /// Extract raw resource payloads from a KFC2 archive
    Unpack {
        /// Path to the .kfc file
        #[arg(short, long, env = "INPUT_KFC")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Decode resources to XML using a reflection schema
    Decode {
        /// Path to the .kfc file
        #[arg(short, long, env = "INPUT_KFC")]
        input: PathBuf,

        /// Path to the reflection schema JSON dump
        #[arg(short, long)]
        schema: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Only decode resources whose type name contains this substring
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }
        Commands::Unpack { input, output } => {
            cmd_unpack(&input, &output)?;
        }
        Commands::Decode {
            input,
            schema,
            output,
            filter,
        } => {
            cmd_decode(&input, &schema, &output, filter.as_deref())?;
        }
    }

    Ok(())
}

fn cmd_info(input: &PathBuf) -> Result<()> {
    let file = KfcFile::open(input).context("Failed to open KFC2 archive")?;
    let archive = file.archive();
    let svn = archive.svn_version();

    println!("SVN Version: {}", svn.version);
    println!("SVN Branch: {}", svn.branch);
    println!("SVN Timestamp: {}", svn.timestamp);
    println!("Container Count: {}", archive.container_infos().len());
    println!("Resource Count: {}", archive.resource_count());
    println!("Content Count: {}", archive.content_infos().len());
    println!(
        "Reflection Type Count: {}",
        archive.reflection_type_infos().len()
    );

    Ok(())
}

fn cmd_unpack(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Opening KFC2 archive: {}", input.display());

    let start = Instant::now();
    let file = KfcFile::open(input).context("Failed to open KFC2 archive")?;
    let archive = file.archive();

    println!(
        "Loaded {} resources in {:?}",
        archive.resource_count(),
        start.elapsed()
    );

    fs::create_dir_all(output)?;

    let pb = progress_bar(archive.resource_count() as u64)?;

    let start = Instant::now();
    let errors: Vec<String> = (0..archive.resource_count())
        .into_par_iter()
        .filter_map(|i| {
            let result = extract_resource(&file, i, output);
            pb.inc(1);
            result.err().map(|e| format!("resource {}: {:#}", i, e))
        })
        .collect();

    pb.finish_with_message("Done");
    println!(
        "Extracted {} resources in {:?} ({} failed)",
        archive.resource_count() - errors.len(),
        start.elapsed(),
        errors.len()
    );

    for error in &errors {
        eprintln!("error: {}", error);
    }

    Ok(())
}

fn extract_resource(file: &KfcFile, index: usize, output: &PathBuf) -> Result<()> {
    let info = &file.archive().resource_infos()[index];
    let bytes = file.resource_bytes(index)?;

    let filename = resource_file_name(&info.guid, info.part_index, info.type_name_hash);
    fs::write(output.join(filename), bytes)?;

    Ok(())
}

fn cmd_decode(
    input: &PathBuf,
    schema_path: &PathBuf,
    output: &PathBuf,
    filter: Option<&str>,
) -> Result<()> {
    println!("Opening KFC2 archive: {}", input.display());
    let file = KfcFile::open(input).context("Failed to open KFC2 archive")?;
    let archive = file.archive();

    println!("Loading reflection schema: {}", schema_path.display());
    let types = schema::load_from_file(schema_path).context("Failed to load reflection schema")?;
    let catalog = TypeCatalog::build(types).context("Failed to index reflection schema")?;
    let deserializer = Deserializer::new(&catalog);

    println!("Indexed {} types", catalog.len());

    let indices: Vec<usize> = (0..archive.resource_count())
        .filter(|&i| {
            let Some(pattern) = filter else { return true };
            catalog
                .by_hash1(archive.resource_infos()[i].type_name_hash)
                .map(|ty| ty.qualified_name.contains(pattern))
                .unwrap_or(false)
        })
        .collect();

    println!(
        "Decoding {} resources to {}...",
        indices.len(),
        output.display()
    );
    fs::create_dir_all(output)?;

    let pb = progress_bar(indices.len() as u64)?;

    let start = Instant::now();
    // Each resource gets its own reader over the shared map; workers only
    // share the immutable catalog.
    let errors: Vec<String> = indices
        .par_iter()
        .filter_map(|&i| {
            let result = decode_resource(&file, &deserializer, i, output);
            pb.inc(1);
            result.err().map(|e| format!("resource {}: {:#}", i, e))
        })
        .collect();

    pb.finish_with_message("Done");
    println!(
        "Decoded {} resources in {:?} ({} failed)",
        indices.len() - errors.len(),
        start.elapsed(),
        errors.len()
    );

    for error in &errors {
        eprintln!("error: {}", error);
    }

    Ok(())
}

fn decode_resource(
    file: &KfcFile,
    deserializer: &Deserializer<'_>,
    index: usize,
    output: &PathBuf,
) -> Result<()> {
    let info = &file.archive().resource_infos()[index];
    let bytes = file.resource_bytes(index)?;

    let mut reader = BinaryReader::new(bytes);
    let tree = deserializer.decode(&mut reader, info.type_name_hash, "_root")?;
    let xml = XmlExporter::to_xml_string(&tree)?;

    let mut filename = resource_file_name(&info.guid, info.part_index, info.type_name_hash);
    filename.push_str(".xml");
    fs::write(output.join(filename), xml)?;

    Ok(())
}

fn resource_file_name(guid: &KfcGuid, part_index: u32, type_name_hash: u32) -> String {
    format!("{}.{}.{:08X}", guid, part_index, type_name_hash)
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
