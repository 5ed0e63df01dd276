use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use cm_cam::OperationKind;
use cm_core::geometry::{IntegerPaths, IntegerPath, IntegerPoint, SCALE};
use cm_core::units::Unit;
use cm_post::gcode::GCodeEmitter;
use cm_post::job::{CollectingSink, JobDescriptor, OperationDescriptor, Warning};

/// Demonstration host for the CAM core: reads a job file describing a
/// `JobDescriptor` plus a list of `OperationDescriptor`s, compiles and
/// emits G-code, and writes the result to a file or stdout. This binary is
/// not part of the CAM core itself — it exists to exercise the core's pure
/// `compile -> emit` surface end to end.
#[derive(Parser)]
#[command(name = "cam-core", version, about = "Compile 2-D CAM operations into G-code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a job file's operations and emit G-code.
    Run {
        /// Path to the job TOML file.
        job_file: PathBuf,

        /// Write G-code to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// On-disk shape of a job file: the job-wide descriptor plus the ordered
/// list of operations, as a plain TOML project file (geometry points given
/// as plain `[x, y]` pairs in project units, scaled to the internal
/// fixed-point space on load).
#[derive(Debug, Deserialize)]
struct JobFile {
    job: JobSection,
    #[serde(default)]
    tabs: Vec<PathFile>,
    #[serde(default, rename = "operation")]
    operations: Vec<OperationFile>,
}

#[derive(Debug, Deserialize)]
struct JobSection {
    units: Unit,
    top_z: f64,
    bot_z: f64,
    safe_z: f64,
    pass_depth: f64,
    plunge_feed: f64,
    cut_feed: f64,
    rapid_feed: f64,
    retract_feed: f64,
    #[serde(default)]
    decimal: Option<usize>,
    #[serde(default)]
    offset_x: f64,
    #[serde(default)]
    offset_y: f64,
    #[serde(default = "default_scale")]
    x_scale: f64,
    #[serde(default = "default_neg_scale")]
    y_scale: f64,
    #[serde(default = "default_scale")]
    z_scale: f64,
    #[serde(default)]
    return_to_00: bool,
    #[serde(default)]
    tab_z: f64,
}

/// The job file may omit `decimal`; the default then follows the unit
/// system (spec.md: 2 fractional digits for mm, 3 for inches).
fn default_decimal_for(units: Unit) -> usize {
    match units {
        Unit::Millimeters => 2,
        Unit::Inches => 3,
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_neg_scale() -> f64 {
    -1.0
}

#[derive(Debug, Deserialize)]
struct PathFile(Vec<[f64; 2]>);

#[derive(Debug, Deserialize)]
struct OperationFile {
    name: String,
    kind: OperationKind,
    geometry: Vec<PathFile>,
    cutter_diameter: f64,
    #[serde(default)]
    overlap: f64,
    #[serde(default)]
    climb: bool,
    #[serde(default)]
    width: f64,
    cut_depth: f64,
    #[serde(default)]
    ramp: bool,
}

fn to_integer_paths(paths: &[PathFile]) -> IntegerPaths {
    IntegerPaths::new(
        paths
            .iter()
            .map(|p| IntegerPath::new(p.0.iter().map(|&[x, y]| IntegerPoint::from_units(x, y)).collect()))
            .collect(),
    )
}

fn to_internal_units(v: f64) -> i64 {
    (v * SCALE).round() as i64
}

fn build_job(file: &JobFile) -> JobDescriptor {
    let tab_geometry = to_integer_paths(&file.tabs);
    let widest_cutter = file
        .operations
        .iter()
        .map(|op| op.cutter_diameter)
        .fold(0.0_f64, f64::max);
    let bloated = cm_geom::offset(&tab_geometry, to_internal_units(widest_cutter / 2.0));

    JobDescriptor {
        gunits: file.job.units,
        top_z: file.job.top_z,
        bot_z: file.job.bot_z,
        safe_z: file.job.safe_z,
        pass_depth: file.job.pass_depth,
        plunge_feed: file.job.plunge_feed,
        cut_feed: file.job.cut_feed,
        rapid_feed: file.job.rapid_feed,
        retract_feed: file.job.retract_feed,
        decimal: file.job.decimal.unwrap_or_else(|| default_decimal_for(file.job.units)),
        offset_x: file.job.offset_x,
        offset_y: file.job.offset_y,
        x_scale: file.job.x_scale,
        y_scale: file.job.y_scale,
        z_scale: file.job.z_scale,
        return_to_00: file.job.return_to_00,
        tab_geometry: bloated,
        tab_z: file.job.tab_z,
    }
}

fn build_operations(file: &JobFile) -> Vec<OperationDescriptor> {
    file.operations
        .iter()
        .map(|op| OperationDescriptor {
            name: op.name.clone(),
            kind: op.kind,
            geometry: to_integer_paths(&op.geometry),
            cutter_diameter: to_internal_units(op.cutter_diameter),
            overlap: op.overlap,
            climb: op.climb,
            width: to_internal_units(op.width),
            cut_depth: op.cut_depth,
            ramp: op.ramp,
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { job_file, output } => {
            if let Err(err) = run(&job_file, output.as_deref()) {
                tracing::error!("{err}");
                std::process::exit(1);
            }
        }
    }
}

fn run(job_file: &PathBuf, output: Option<&std::path::Path>) -> Result<(), cm_post::PostError> {
    let text = fs::read_to_string(job_file)?;
    let file: JobFile = toml::from_str(&text)?;

    let mut job = build_job(&file);
    let mut operations = build_operations(&file);
    let mut sink = CollectingSink::default();
    job.clamp_pass_depth(&mut sink);

    tracing::info!(
        operations = operations.len(),
        units = ?job.gunits,
        "compiling job"
    );

    let emitter = GCodeEmitter::new(&job);
    let (lines, errors) = emitter.emit(&mut operations, &mut sink);

    for warning in &sink.0 {
        log_warning(warning);
    }
    for error in &errors {
        tracing::warn!("operation failed: {error}");
    }

    let text = lines.join("\n");
    match output {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }

    Ok(())
}

fn log_warning(warning: &Warning) {
    match warning {
        Warning::PassDepthTooSmall { clamped_to } => {
            tracing::warn!(clamped_to, "pass depth below zero, clamped");
        }
        Warning::CutDepthTooSmall { clamped_to } => {
            tracing::warn!(clamped_to, "cut depth below zero, clamped");
        }
        Warning::UnsupportedOperation { name } => {
            tracing::warn!(name = %name, "operation unsupported, skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_job_file() {
        let toml_text = r#"
            [job]
            units = "millimeters"
            top_z = 0.0
            bot_z = -10.0
            safe_z = 10.0
            pass_depth = 3.0
            plunge_feed = 300.0
            cut_feed = 1200.0
            rapid_feed = 3000.0
            retract_feed = 500.0

            [[operation]]
            name = "pocket-1"
            kind = "pocket"
            geometry = [[[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]]]
            cutter_diameter = 3.0
            overlap = 0.4
            cut_depth = 6.0
        "#;
        let file: JobFile = toml::from_str(toml_text).unwrap();
        assert_eq!(file.operations.len(), 1);
        let job = build_job(&file);
        assert_eq!(job.y_scale, -1.0);
        let ops = build_operations(&file);
        assert_eq!(ops[0].kind, OperationKind::Pocket);
    }
}
