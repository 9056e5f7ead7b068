//! # Spanline CLI
//!
//! Runs continuous beam and frame analyses from JSON input files and prints
//! a summary, or the full JSON report with `--json`.
//!
//! ```text
//! beam_cli beam demos/two_span_beam.json
//! beam_cli frame demos/portal_frame.json --json
//! beam_cli project job.beam.json --settings demos/settings.json
//! beam_cli init-settings settings.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use beam_core::calculations::{ContinuousBeamInput, FrameInput};
use beam_core::design::SectionDesignResult;
use beam_core::{
    load_json, load_project, run_item, save_json, AnalysisItem, AnalysisReport, AnalysisSettings,
    CalcResult,
};

#[derive(Parser)]
#[command(name = "beam_cli")]
#[command(about = "Spanline CLI - continuous beam and frame analysis", long_about = None)]
struct Cli {
    /// Analysis settings JSON (overrides project settings)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Print the full JSON report instead of the summary
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a continuous beam by the three-moment theorem
    Beam {
        /// Path to a beam input JSON file
        input: PathBuf,
    },
    /// Solve a beam or frame by moment distribution
    Frame {
        /// Path to a frame input JSON file
        input: PathBuf,
    },
    /// Solve every item in a project file
    Project {
        /// Path to the project JSON file
        file: PathBuf,
    },
    /// Write the default analysis settings
    InitSettings {
        /// Output path
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn settings_or(cli: &Cli, fallback: AnalysisSettings) -> CalcResult<AnalysisSettings> {
    match &cli.settings {
        Some(path) => {
            let settings: AnalysisSettings = load_json(path)?;
            settings.validate()?;
            debug!(path = %path.display(), "settings loaded");
            Ok(settings)
        }
        None => Ok(fallback),
    }
}

fn run(cli: &Cli) -> CalcResult<()> {
    match &cli.command {
        Commands::Beam { input } => {
            let beam: ContinuousBeamInput = load_json(input)?;
            let settings = settings_or(cli, AnalysisSettings::default())?;
            let report = run_item(&AnalysisItem::ContinuousBeam(beam), &settings)?;
            output(cli, &report)
        }
        Commands::Frame { input } => {
            let frame: FrameInput = load_json(input)?;
            let settings = settings_or(cli, AnalysisSettings::default())?;
            let report = run_item(&AnalysisItem::Frame(frame), &settings)?;
            output(cli, &report)
        }
        Commands::Project { file } => cmd_project(cli, file),
        Commands::InitSettings { output } => {
            save_json(&AnalysisSettings::default(), output)?;
            println!("Wrote default settings to {}", output.display());
            Ok(())
        }
    }
}

fn cmd_project(cli: &Cli, file: &Path) -> CalcResult<()> {
    let mut project = load_project(file)?;
    project.settings = settings_or(cli, project.settings.clone())?;

    println!(
        "Project {} ({}) - {} item(s)",
        project.meta.job_id,
        project.meta.client,
        project.item_count()
    );
    let mut failed = 0usize;
    for (id, outcome) in project.run_all() {
        match outcome {
            Ok(report) => output(cli, &report)?,
            Err(e) => {
                failed += 1;
                eprintln!("Item {} failed: {}", id, e);
            }
        }
    }
    if failed > 0 {
        eprintln!("{} item(s) failed", failed);
    }
    Ok(())
}

fn output(cli: &Cli, report: &AnalysisReport) -> CalcResult<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("═══════════════════════════════════════");
    println!("  {}", report.label());
    println!("═══════════════════════════════════════");
    match report {
        AnalysisReport::ContinuousBeam {
            result,
            extrema,
            design,
            ..
        } => {
            println!();
            println!("Support moments (kN·m):");
            for (k, m) in result.support_moments.iter().enumerate() {
                println!("  S{:<3} {:>10.3}", k, m);
            }
            println!();
            println!("Reactions (kN):");
            for (k, r) in result.reactions.iter().enumerate() {
                println!("  S{:<3} {:>10.3}", k, r);
            }
            println!("  Σ    {:>10.3}  (applied {:.3})", result.reactions.iter().sum::<f64>(), result.total_applied_load);
            println!();
            println!("Extremes:");
            println!("  M+  = {:>9.3} kN·m at {:.3} m", extrema.max_sagging.value, extrema.max_sagging.position);
            println!("  M-  = {:>9.3} kN·m at {:.3} m", extrema.max_hogging.value, extrema.max_hogging.position);
            println!("  V   = {:>9.3} kN   at {:.3} m", extrema.max_shear.value, extrema.max_shear.position);
            println!("  δ   = {:>9.3} mm   at {:.3} m (approx.)", extrema.max_deflection.value * 1e3, extrema.max_deflection.position);
            if let Some(design) = design {
                print_design(design);
            }
        }
        AnalysisReport::Frame { result, .. } => {
            println!();
            println!(
                "Moment distribution: {} after {} iteration(s), max unbalance {:.3e}",
                if result.convergence_achieved { "converged" } else { "NOT converged" },
                result.iterations_performed,
                result.final_max_unbalance
            );
            println!();
            println!("End moments (kN·m, clockwise +):");
            for (name, m) in &result.final_moments {
                println!("  {:<8} {:>10.3} {:>10.3}", name, m.start, m.end);
            }
            println!();
            println!("Reactions (kN, kN·m):        H          V          M");
            for (joint, r) in &result.support_reactions {
                println!(
                    "  {:<8} {:>18.3} {:>10.3} {:>10.3}",
                    joint, r.horizontal, r.vertical, r.moment
                );
            }
            if !result.axial_forces.is_empty() {
                println!();
                println!("Axial forces (kN, tension +):");
                for (name, n) in &result.axial_forces {
                    println!("  {:<8} {:>10.3}", name, n);
                }
            }
        }
    }
    let warnings = report.warnings();
    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in warnings {
            println!("  [{}] {}", w.code(), w);
        }
    }
    println!();
}

fn print_design(design: &SectionDesignResult) {
    println!();
    println!("Section design ({}):", design.code);
    for (name, flexure) in [("Sagging", &design.sagging), ("Hogging", &design.hogging)] {
        if let Some(f) = flexure {
            let bars = f
                .tension_bars
                .map(|b| b.to_string())
                .unwrap_or_else(|| "no single-layer fit".to_string());
            println!(
                "  {:<8} M={:>8.2}  As,req={:>7.0} mm²  {}  {:.2} {}",
                name,
                f.design_moment.value,
                f.as_required,
                bars,
                f.unity,
                status_icon(f.passes())
            );
        }
    }
    let s = &design.shear;
    println!(
        "  Shear    V={:>8.2}  v={:.2} vc={:.2} N/mm²  Asv/sv={:.3} ({:?})  {:.2} {}",
        s.design_shear.value.abs(),
        s.v,
        s.vc,
        s.asv_over_sv,
        s.regime,
        s.unity,
        status_icon(s.passes())
    );
    println!(
        "  RESULT: {} (governs: {})",
        if design.passes { "PASS" } else { "FAIL" },
        design.governing_condition
    );
}

fn status_icon(pass: bool) -> &'static str {
    if pass { "[OK]" } else { "[FAIL]" }
}
