use std::path::PathBuf;

use caltech256::{download::default_root, Caltech256, LoaderBackend};
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use dfdx::data::ExactSizeDataset;
use rand::{rngs::StdRng, SeedableRng};

/// Verify a Caltech-256 copy and decode a few random samples.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding the archive; defaults to ~/.caltech256/data
    #[arg(long)]
    root: Option<PathBuf>,

    /// Download and extract the archive first
    #[arg(long)]
    download: bool,

    /// Image decoding backend: buffered or in-memory
    #[arg(long, default_value_t = LoaderBackend::Buffered)]
    backend: LoaderBackend,

    /// Number of randomly chosen samples to decode
    #[arg(long, default_value_t = 8)]
    spot_check: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .init();
    color_eyre::install()?;
    let args = Args::parse();

    let root = match args.root {
        Some(root) => root,
        None => default_root().context("locating the default data directory")?,
    };
    let dataset = Caltech256::builder(&root)
        .download(args.download)
        .backend(args.backend)
        .build()
        .with_context(|| format!("loading Caltech-256 from {}", root.display()))?;

    println!("folder:  {}", dataset.base_folder().display());
    println!("classes: {}", dataset.classes().len());
    println!("samples: {}", dataset.len());

    let mut rng = StdRng::seed_from_u64(args.seed);
    for sample in dataset.shuffled(&mut rng).take(args.spot_check) {
        let (image, label) = sample.context("decoding sample")?;
        println!(
            "{label:>4} {:<32} {}x{}",
            dataset.classes()[label],
            image.width(),
            image.height()
        );
    }
    Ok(())
}
