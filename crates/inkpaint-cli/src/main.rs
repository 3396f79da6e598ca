//! `inks-render`: render an InkScript document to PNG.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use inkpaint_core::storage::write_atomic;
use inkpaint_core::{FormatError, Scene, StorageError};
use inkpaint_render::{CpuRasterizer, Rasterizer, RendererError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse { path: PathBuf, source: FormatError },
    #[error("render failed: {0}")]
    Render(#[from] RendererError),
    #[error("cannot write output: {0}")]
    Write(#[from] StorageError),
}

#[derive(Parser, Debug)]
#[command(name = "inks-render", version, about = "Render an InkScript (.inks) document to PNG")]
struct Cli {
    /// Input `.inks` file.
    input: PathBuf,

    /// Output `.png` file.
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli.input, &cli.output) {
        Ok(()) => {
            println!("Rendered {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("{e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, output: &Path) -> Result<(), CliError> {
    let text = std::fs::read_to_string(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let document = inkpaint_core::parse(&text).map_err(|source| CliError::Parse {
        path: input.to_path_buf(),
        source,
    })?;

    let scene = Scene::from_document(&document);
    log::info!(
        "{}: {}x{} canvas, {} render commands",
        input.display(),
        scene.width,
        scene.height,
        scene.commands.len()
    );

    let png = CpuRasterizer::new().render(&scene)?.to_png()?;
    write_atomic(output, &png)?;
    Ok(())
}
