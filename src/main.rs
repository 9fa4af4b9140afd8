//! Command-line driver: read a config, load the mesh, run, report.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use oil_spill::{
    BayCurrent, Config, Simulation, TransportDiagnostics, load_mesh, logging, write_vtk_series,
};

/// Oil spill transport on a triangle mesh
#[derive(Parser)]
#[command(name = "oil-spill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate an oil slick drifting over a bay", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "input.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); falls back to RUST_LOG, then info
    #[arg(short, long)]
    log_level: Option<String>,

    /// Directory for the log file
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to read config {}", cli.config.display()))?;

    let log_path = config.log_path(&cli.log_dir);
    logging::init_logging(cli.log_level.as_deref(), Some(log_path.as_path()))
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    info!("=== oil spill simulation ===");
    info!("config: {}", cli.config.display());

    let mesh = load_mesh(&config.mesh_file, &BayCurrent)
        .with_context(|| format!("failed to load mesh {}", config.mesh_file.display()))?;
    let mesh = Arc::new(mesh);
    info!(
        "mesh: {} triangles, {} lines, {} points",
        mesh.n_triangles(),
        mesh.n_lines(),
        mesh.n_points()
    );

    let mut sim = Simulation::new(Arc::clone(&mesh), config.dt)?
        .with_fishing_ground(config.fishing_ground);
    sim.set_initial_state(config.x_start, config.sigma2)?;

    let dt_max = sim.max_stable_dt();
    if config.dt > dt_max {
        warn!(
            "dt = {:.3e} exceeds the stable limit {:.3e} (CFL = {:.2})",
            config.dt,
            dt_max,
            sim.courant_number()
        );
    }

    info!(
        "fishing ground {}: {} cells, initial oil {:.6}",
        config.fishing_ground,
        sim.find_fishing_ground_cells().len(),
        sim.oil_in_fishing_ground()?
    );

    let base = config.output_dir.join("oil.vtu");
    if config.write_frequency.is_some() {
        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("failed to create output directory {}", config.output_dir.display())
        })?;
        write_vtk_series(&base, 0, &mesh, sim.state(), sim.time())?;
    }

    let summary = sim.run_with_callback(config.t_end, config.write_frequency, |frame| {
        let path = write_vtk_series(&base, frame.step, &mesh, frame.state, frame.time)?;
        log::debug!("wrote {}", path.display());
        anyhow::Ok(())
    })?;

    let diag = TransportDiagnostics::compute(&sim)?;
    info!(
        "finished {} steps to t = {:.4} in {:.2}s",
        summary.steps, summary.final_time, summary.wall_time
    );
    info!("{}", diag.summary_line());
    info!(
        "oil in fishing ground at t = {:.4}: {:.6}",
        sim.time(),
        diag.fishing_ground_oil
    );
    println!("{:.6}", diag.fishing_ground_oil);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_defers_to_environment() {
        let cli = Cli::try_parse_from(["oil-spill"]).unwrap();
        assert_eq!(cli.log_level, None);
        assert_eq!(cli.config, PathBuf::from("input.toml"));
        assert_eq!(cli.log_dir, PathBuf::from("."));

        let cli = Cli::try_parse_from(["oil-spill", "-l", "debug", "-c", "bay.toml"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, PathBuf::from("bay.toml"));
    }
}
