use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use scene_engine::core::{ApplicationConfig, Config};
use scene_engine::encoder::{Document, DocumentDescription, EncodeSummary, PackageReader};
use scene_engine::foundation::logging;
use scene_engine::foundation::time::PlatformClock;

const TEXT_EXTENSION: &str = "txt";

#[derive(Debug)]
struct EncodeJob {
    input: PathBuf,
    output: PathBuf,
    text: Option<PathBuf>,
    verify: bool,
}

fn main() -> Result<()> {
    let matches = Command::new("scene_encoder")
        .about("Encodes a RON or TOML scene description into a binary scene container")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Scene description (.ron or .toml)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Binary container to write")
                .required(true),
        )
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .value_name("FILE")
                .help("Also write the text form to this file"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Application configuration (.ron or .toml)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (error, warn, info, debug, trace)"),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .help("Read the written container back and check it")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => ApplicationConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {path}"))?,
        None => ApplicationConfig::default(),
    };
    config.validate().context("Invalid configuration")?;

    let level = matches
        .get_one::<String>("log-level")
        .map_or(config.engine.log_level.as_str(), String::as_str);
    logging::init_with_level(level);

    let output = PathBuf::from(matches.get_one::<String>("output").context("missing output")?);
    let text = matches
        .get_one::<String>("text")
        .map(PathBuf::from)
        .or_else(|| config.encoder.write_text_dump.then(|| output.with_extension(TEXT_EXTENSION)));

    let job = EncodeJob {
        input: PathBuf::from(matches.get_one::<String>("input").context("missing input")?),
        output,
        text,
        verify: matches.get_flag("verify"),
    };
    log::debug!("Encode job: {:?}", job);

    run(&job, &config)
}

fn run(job: &EncodeJob, config: &ApplicationConfig) -> Result<()> {
    let mut clock = PlatformClock::system();
    clock.init();

    let description = DocumentDescription::load_from_file(&job.input)
        .with_context(|| format!("Failed to load scene description {:?}", job.input))?;
    let mut document = Document::from_description(&description)
        .with_context(|| format!("Invalid scene description {:?}", job.input))?;
    log::info!(
        "Loaded {:?}: {} lights, {} cameras, {} scenes",
        job.input,
        document.lights().len(),
        document.cameras().len(),
        document.scenes().len()
    );

    let summary = match write_container(&mut document, &job.output, config) {
        Ok(summary) => summary,
        Err(e) => {
            discard_partial_output(&job.output);
            return Err(e);
        }
    };

    if let Some(text_path) = &job.text {
        write_text(&document, text_path, config)?;
    }

    if job.verify {
        verify(&job.output, &summary)?;
    }

    log::info!(
        "Wrote {:?}: {} objects, {} references, {} bytes in {} ms",
        job.output,
        summary.objects,
        summary.references,
        summary.bytes,
        clock.absolute_time()
    );
    Ok(())
}

fn write_container(document: &mut Document, path: &Path, config: &ApplicationConfig) -> Result<EncodeSummary> {
    let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
    let (writer, summary) = document
        .write_binary(BufWriter::new(file), &config.encoder)
        .with_context(|| format!("Failed to encode {path:?}"))?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .and_then(|file| file.sync_all())
        .with_context(|| format!("Failed to flush {path:?}"))?;
    Ok(summary)
}

/// Delete a half-written container. Returns whether the path is gone.
fn discard_partial_output(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }
    log::warn!("Removing incomplete output {:?}", path);
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not remove incomplete output {:?}: {}", path, e);
            false
        }
    }
}

fn write_text(document: &Document, path: &Path, config: &ApplicationConfig) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
    let mut out = BufWriter::new(file);
    document
        .write_text(&mut out, &config.encoder)
        .with_context(|| format!("Failed to write text form {path:?}"))?;
    out.flush()?;
    log::info!("Wrote text form {:?}", path);
    Ok(())
}

fn verify(path: &Path, summary: &EncodeSummary) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read back {path:?}"))?;
    let reader = PackageReader::open(&bytes).context("Written container does not open")?;
    let record = reader.read_document().context("Written container does not decode")?;

    anyhow::ensure!(
        reader.references().len() == summary.references,
        "Reference table has {} entries, expected {}",
        reader.references().len(),
        summary.references
    );
    for entry in reader.references() {
        let envelope = reader.read_envelope(entry.offset)?;
        anyhow::ensure!(
            envelope.id == entry.id && envelope.type_id == entry.type_id,
            "Reference {:?} points at {:?} {:?}",
            entry.id,
            envelope.type_id,
            envelope.id
        );
    }
    log::info!(
        "Verified {:?}: {} lights, {} cameras, {} scenes",
        path,
        record.lights.len(),
        record.cameras.len(),
        record.scenes.len()
    );
    Ok(())
}
