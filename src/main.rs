use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use fretwise::arrange::{ArrangeOptions, arrange};
use fretwise::config::AppConfig;
use fretwise::difficulty;
use fretwise::fretboard::fret_distance;
use fretwise::graph::PositionGraph;
use fretwise::theory::{Mode, Tuning, split_note_names};
use fretwise::{midi, render};

#[derive(Parser)]
#[command(
    name = "fretwise",
    version,
    about = "MIDI to tablature converter with ergonomic fingering optimization"
)]
struct Cli {
    /// MIDI file to convert
    source: PathBuf,

    /// Output file (defaults to the source path with a .txt extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tuning as a compact run of note names, low to high, e.g. "E2A2D3G3B3E4"
    #[arg(short, long)]
    tuning: Option<String>,

    /// Number of frets on the instrument
    #[arg(long)]
    frets: Option<usize>,

    /// Restrict playable frets to a diatonic mode (ionian, dorian, ...)
    #[arg(long)]
    diatonic: Option<String>,

    /// Tab line wrap width in characters
    #[arg(long)]
    wrap: Option<usize>,

    /// Number of parallel workers (0 = auto-detect from config)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load();

    let tuning = resolve_tuning(&cli, &config).context("Invalid tuning")?;
    log::info!(
        "Tuning: {} ({} frets)",
        tuning
            .strings()
            .iter()
            .rev()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        tuning.nfrets()
    );
    log::debug!(
        "Neck length to last fret: {:.1} mm",
        fret_distance(tuning.nfrets(), config.scale_length)
    );

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.source.with_extension("txt"));

    let start = Instant::now();

    let chords = midi::load_chords(&cli.source).context("Failed to load MIDI file")?;
    let chords = midi::filter_playable_range(chords, &tuning);
    if chords.is_empty() {
        anyhow::bail!("No playable notes found in {}", cli.source.display());
    }

    let graph = PositionGraph::build(&tuning);
    log::debug!("Position graph: {} nodes", graph.len());

    let pitch_sequence: Vec<_> = chords.iter().map(|c| c.pitches.clone()).collect();
    let options = ArrangeOptions {
        max_permuted: config.max_permuted_notes,
        workers: if cli.jobs > 0 {
            cli.jobs
        } else {
            config.resolve_workers()
        },
        progress: true,
    };
    let arrangement = arrange(&graph, &pitch_sequence, &options)
        .context("Failed to find a playable fingering")?;

    let wrap = cli.wrap.unwrap_or(config.wrap_width);
    let tab = render::render_tab(&tuning, &arrangement.paths, wrap);
    std::fs::write(&output, &tab)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let fingers: usize = arrangement
        .paths
        .iter()
        .map(|p| difficulty::nfingers(p))
        .sum();
    println!(
        "Arranged {} chords ({} fretted notes, cost {:.2}) in {:.2}s",
        arrangement.paths.len(),
        fingers,
        arrangement.total_cost,
        start.elapsed().as_secs_f64()
    );
    println!("Tab written to {}", output.display());

    Ok(())
}

/// Resolve the tuning from CLI > config > standard guitar. CLI and config
/// conventions differ deliberately: the CLI takes a compact low-to-high run
/// (matching how players name tunings), the config lists thin to thick.
fn resolve_tuning(cli: &Cli, config: &AppConfig) -> Result<Tuning> {
    let nfrets = cli.frets.unwrap_or(config.nfrets);
    let mode = cli
        .diatonic
        .as_deref()
        .or(config.diatonic_mode.as_deref())
        .map(Mode::from_str)
        .transpose()?;

    let names: Vec<String> = if let Some(arg) = &cli.tuning {
        let mut names = split_note_names(arg)?;
        names.reverse(); // low-to-high on the CLI, thin-to-thick internally
        names
    } else if !config.tuning.is_empty() {
        config.tuning.clone()
    } else {
        fretwise::STANDARD_TUNING.iter().map(|s| s.to_string()).collect()
    };

    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    Ok(Tuning::from_names(&name_refs, nfrets, mode)?)
}
