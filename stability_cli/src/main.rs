//! # Stability CLI
//!
//! Command-line front end for `stability_core`:
//! - `compute` evaluates a condition stored in a `.stab` project file
//! - `gz` samples a GZ curve from a KN workbook and prints its statistics
//! - `demo` evaluates a built-in livestock carrier, optionally saving it as a project

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stability_core::alarms::{build_alarm_rows, AlarmStatus};
use stability_core::gz::{compute_gz_curve, load_kn_workbook, DEFAULT_ANGLE_MAX_DEG, DEFAULT_ANGLE_STEP_DEG, MAX_GZ_SAMPLES};
use stability_core::model::{CargoType, LivestockPen, LoadingCondition, Ship, Tank, TankType};
use stability_core::{load_project, save_project, ConditionResults, FileLock, Project};

#[derive(Parser, Debug)]
#[command(author, version, about = "Intact stability calculations for livestock carriers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a loading condition stored in a project file.
    Compute {
        /// Project file (.stab).
        #[arg(long)]
        project: PathBuf,
        /// Name of the stored loading condition.
        #[arg(long)]
        condition: String,
        /// Print the full results as JSON.
        #[arg(long)]
        json: bool,
        /// Write the recorded results back to the project file.
        #[arg(long)]
        save: bool,
        /// Name recorded in the lock file while saving.
        #[arg(long, default_value = "stability_cli")]
        user: String,
    },
    /// Sample a GZ curve from a KN workbook.
    Gz {
        /// KN workbook (JSON).
        #[arg(long)]
        kn: PathBuf,
        /// Displacement (t).
        #[arg(long)]
        displacement: f64,
        /// Vertical centre of gravity (m).
        #[arg(long)]
        kg: f64,
        /// Trim (m); selects the nearest sheet.
        #[arg(long, default_value_t = 0.0)]
        trim: f64,
        /// Heel angle step (degrees).
        #[arg(long, default_value_t = DEFAULT_ANGLE_STEP_DEG)]
        step: f64,
        /// Largest heel angle (degrees).
        #[arg(long, default_value_t = DEFAULT_ANGLE_MAX_DEG)]
        max: f64,
        /// Print every sampled point.
        #[arg(long)]
        points: bool,
    },
    /// Evaluate the built-in demonstration vessel.
    Demo {
        /// Save the demonstration project to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Compute {
            project,
            condition,
            json,
            save,
            user,
        } => handle_compute(&project, &condition, json, save.then_some(user.as_str())),
        Command::Gz {
            kn,
            displacement,
            kg,
            trim,
            step,
            max,
            points,
        } => handle_gz(&kn, displacement, kg, trim, step, max, points),
        Command::Demo { out } => handle_demo(out.as_deref()),
    }
}

fn handle_compute(path: &Path, condition: &str, json: bool, save_as: Option<&str>) -> Result<()> {
    // Hold the lock across load and save so the recorded results land on the file we read
    let lock = save_as
        .map(|user| FileLock::acquire(path, user))
        .transpose()
        .with_context(|| format!("failed to lock {}", path.display()))?;

    let mut project = load_project(path).with_context(|| format!("failed to load project from {}", path.display()))?;
    let results = project
        .evaluate(condition)
        .with_context(|| format!("failed to evaluate condition '{}'", condition))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&project.ship.name, condition, &results);
    }

    if lock.is_some() {
        save_project(&project, path).with_context(|| format!("failed to save project to {}", path.display()))?;
        println!("Saved results to {}", path.display());
    }
    Ok(())
}

fn handle_gz(kn: &Path, displacement: f64, kg: f64, trim: f64, step: f64, max: f64, points: bool) -> Result<()> {
    if step <= 0.0 || max <= 0.0 {
        bail!("angle step and maximum must be positive");
    }
    let workbook = load_kn_workbook(kn).with_context(|| format!("failed to load KN tables from {}", kn.display()))?;
    let Some(row) = workbook.row_for(displacement, trim) else {
        bail!("KN workbook {} has no sheets", kn.display());
    };

    let curve = compute_gz_curve(kg, &row, step, max);
    if curve.is_empty() {
        bail!("angle step {} up to {}° exceeds {} samples", step, max, MAX_GZ_SAMPLES);
    }
    let stats = curve.stats();
    println!("GZ curve: displacement {:.1} t, KG {:.3} m, trim {:.2} m", displacement, kg, trim);
    println!("  Max GZ:          {:.3} m at {:.2}°", stats.max_gz_m, stats.angle_at_max_gz_deg);
    println!("  Area to {:>5.1}°: {:.4} m·rad", max, stats.area_m_rad);
    println!("  Positive range:  {:.2}°", stats.range_positive_deg);

    if points {
        for (angle, gz) in curve.angles_deg.iter().zip(&curve.gz_m) {
            println!("{:>7.2} {:>8.4}", angle, gz);
        }
    }
    Ok(())
}

fn handle_demo(out: Option<&Path>) -> Result<()> {
    let mut project = demo_project();
    let results = project.evaluate("Departure").context("failed to evaluate demonstration condition")?;
    print_results(&project.ship.name, "Departure", &results);

    if let Some(path) = out {
        save_project(&project, path).with_context(|| format!("failed to save project to {}", path.display()))?;
        println!("Saved demonstration project to {}", path.display());
    }
    Ok(())
}

fn print_results(ship: &str, condition: &str, results: &ConditionResults) {
    println!("═══════════════════════════════════════");
    println!("  {} - {}", ship, condition);
    println!("═══════════════════════════════════════");
    println!("  Displacement:  {:>9.1} t", results.displacement_t);
    println!("  Draft (mean):  {:>9.3} m", results.draft_m);
    println!("  Draft aft/fwd: {:>9.3} / {:.3} m", results.draft_aft_m, results.draft_fwd_m);
    println!("  Trim:          {:>9.3} m", results.trim_m);
    println!("  Heel:          {:>9.2}°", results.heel_deg);
    println!("  KG / KM:       {:>9.3} / {:.3} m", results.kg_m, results.km_m);
    println!("  GM (solid):    {:>9.3} m", results.gm_m);
    println!("  GM (eff.):     {:>9.3} m", results.gm_effective_m());
    println!();

    for row in build_alarm_rows(results) {
        println!(
            "{:>3}. {:<5} {:<40} {:>14}  {}",
            row.no,
            status_label(row.status),
            row.description,
            row.attained,
            row.pass_if
        );
    }

    if let Some(criteria) = &results.criteria {
        println!();
        println!(
            "RESULT: {} ({} passed, {} failed, {} n/a)",
            if criteria.all_passed() { "PASS" } else { "FAIL" },
            criteria.passed,
            criteria.failed,
            criteria.n_a
        );
    }
}

fn status_label(status: AlarmStatus) -> &'static str {
    match status {
        AlarmStatus::Pass => "[OK]",
        AlarmStatus::Fail => "[FAIL]",
        AlarmStatus::Warn => "[WARN]",
    }
}

/// A small livestock carrier with two conditions.
fn demo_project() -> Project {
    let ship = Ship::new("MV Demo Carrier", 118.0, 19.4, 9.45, 7.6).with_lightship(5076.0, 4.188);
    let mut project = Project::new(ship, "stability_cli demo");
    project.settings.use_reference_vessel = true;
    project.cargo_type = Some(CargoType::default());

    let tank = |id, name: &str, tank_type, capacity_m3, position, kg_m| Tank {
        tank_type,
        ..Tank::new(id, name, capacity_m3, position, kg_m)
    };
    project.tanks = vec![
        tank(1, "WB 1 DB", TankType::Ballast, 600.0, 0.75, 0.8),
        tank(2, "WB 2 DB", TankType::Ballast, 800.0, 0.50, 0.8),
        tank(3, "FO 3 P/S", TankType::Fuel, 400.0, 0.30, 1.2),
        tank(4, "FW Aft", TankType::FreshWater, 300.0, 0.10, 4.0),
    ];
    project.pens = vec![
        LivestockPen::new(1, "Deck 1", 10.5, 40.0, 420.0),
        LivestockPen::new(2, "Deck 1", 10.5, 75.0, 420.0),
        LivestockPen::new(3, "Deck 2", 13.2, 40.0, 400.0),
        LivestockPen::new(4, "Deck 2", 13.2, 75.0, 400.0),
    ];

    project.save_condition(
        &LoadingCondition::new("Departure")
            .with_tank_volume(1, 600.0)
            .with_tank_volume(2, 800.0)
            .with_tank_volume(3, 380.0)
            .with_tank_volume(4, 280.0)
            .with_pen_loading(1, 220)
            .with_pen_loading(2, 220)
            .with_pen_loading(3, 200)
            .with_pen_loading(4, 200),
    );
    project.save_condition(
        &LoadingCondition::new("Arrival")
            .with_tank_volume(1, 600.0)
            .with_tank_volume(2, 800.0)
            .with_tank_volume(3, 60.0)
            .with_tank_volume(4, 40.0)
            .with_pen_loading(1, 218)
            .with_pen_loading(2, 219)
            .with_pen_loading(3, 198)
            .with_pen_loading(4, 199),
    );
    project
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
