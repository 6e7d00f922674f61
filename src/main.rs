use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phylomass::parser::ParseError;
use phylomass::placement::{DEFAULT_THRESHOLD, partition_by_clades, read_clade_directory};

#[derive(Parser, Debug)]
#[command(name = "phylomass")]
#[command(about = "Partition jplace placement queries into clades by placement mass")]
struct Cli {
    /// Input jplace file
    jplace: PathBuf,
    /// Directory of clade files: one plain-text file per clade, the file
    /// stem is the clade name, one taxon name per line
    clade_dir: PathBuf,
    /// Output directory, one jplace file per clade is written into it
    out_dir: PathBuf,
    /// Minimum share of a pquery's placement mass a clade must hold to
    /// claim it
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ParseError> {
    let sample = phylomass::read_jplace_file(&cli.jplace)?;
    if !sample.validate() {
        tracing::warn!("input sample failed validation; results may be unreliable");
    }
    tracing::info!(
        pqueries = sample.pquery_count(),
        placements = sample.placement_count(),
        "loaded placements"
    );

    let clades = read_clade_directory(&cli.clade_dir)?;
    let partition = partition_by_clades(&sample, &clades, cli.threshold);

    std::fs::create_dir_all(&cli.out_dir)?;
    for (name, part) in &partition {
        let path = cli.out_dir.join(format!("{}.jplace", name));
        if phylomass::write_jplace_file(part, &path)? {
            tracing::info!(clade = %name, pqueries = part.pquery_count(), path = %path.display(), "wrote clade sample");
        }
    }

    Ok(())
}
