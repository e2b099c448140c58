//! GBM Packager - create playable movie images
//!
//! Bundles one `.gbm` video container and one `.gbs` audio container into a
//! single image: the player ROM (when given), padded to a 256-byte
//! boundary, followed by an archive holding the pair as `movie.gbm` and
//! `movie.gbs`.
//!
//! # Usage
//!
//! ```bash
//! # Auto output name (derives input.gba, never overwrites)
//! gbm-packager input.gbm input.gbs
//!
//! # Explicit output name
//! gbm-packager output.gba input.gbm input.gbs
//!
//! # Prepend a player ROM
//! gbm-packager --player player.gba input.gbm input.gbs
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use media_common::ArchiveBuilder;

/// Create a playable image from a GBM/GBS media pair
#[derive(Parser)]
#[command(name = "gbm-packager")]
#[command(about = "Create a playable image from a GBM/GBS media pair")]
#[command(version)]
struct Cli {
    /// `in.gbm in.gbs` (any order, auto output name) or
    /// `out.gba in.gbm in.gbs`
    #[arg(required = true, num_args = 2..=3)]
    files: Vec<PathBuf>,

    /// Player ROM to prepend; without it the image is just the padded
    /// archive
    #[arg(long)]
    player: Option<PathBuf>,
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Resolve the invocation form into (output, gbm, gbs)
fn classify(files: &[PathBuf]) -> Result<(PathBuf, PathBuf, PathBuf)> {
    match files {
        [a, b] => {
            let gbm = [a, b].into_iter().find(|p| has_extension(p, "gbm"));
            let gbs = [a, b].into_iter().find(|p| has_extension(p, "gbs"));
            let (Some(gbm), Some(gbs)) = (gbm, gbs) else {
                bail!("need one .gbm and one .gbs file");
            };
            let output = unique_path(gbm.with_extension("gba"));
            Ok((output, gbm.clone(), gbs.clone()))
        }
        [output, gbm, gbs] => Ok((output.clone(), gbm.clone(), gbs.clone())),
        _ => unreachable!("clap enforces 2..=3 files"),
    }
}

/// Avoid overwriting an existing output: try `name_1`, `name_2`, ...
fn unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());
    for n in 1..1000 {
        let name = match &extension {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
    }
    path
}

fn align256(value: usize) -> usize {
    (value + 255) & !255
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let (output, gbm_path, gbs_path) = classify(&cli.files)?;

    let gbm = fs::read(&gbm_path)
        .with_context(|| format!("cannot read GBM input: {}", gbm_path.display()))?;
    let gbs = fs::read(&gbs_path)
        .with_context(|| format!("cannot read GBS input: {}", gbs_path.display()))?;

    let archive = ArchiveBuilder::new()
        .add("movie.gbm", &gbm)
        .add("movie.gbs", &gbs)
        .build();

    let mut image = match &cli.player {
        Some(player) => fs::read(player)
            .with_context(|| format!("cannot read player ROM: {}", player.display()))?,
        None => Vec::new(),
    };
    image.resize(align256(image.len()), 0);
    image.extend_from_slice(&archive);

    fs::write(&output, &image)
        .with_context(|| format!("cannot create output file: {}", output.display()))?;

    println!("Created: {} ({} bytes)", output.display(), image.len());
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(&cli)?;
    Ok(())
}
