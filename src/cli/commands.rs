use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::catalog::PlatformCatalog;
use crate::filter::resolve::{Resolution, resolve};
use crate::runner::aggregate;
use crate::runner::build::{BuildSystem, NinjaBuild, build_all};
use crate::runner::execute::{Launcher, ProcessLauncher, ProcessRunner};
use crate::runner::report::{emit_report_json, to_report};

/// Everything the driver needs for one invocation.
pub struct RunOptions {
    pub platform: String,
    pub config: String,
    pub device_id: Option<String>,
    pub target: Option<String>,
    pub out_directory: PathBuf,
    pub catalog: Option<PathBuf>,
    pub init_command: Option<String>,
    pub ninja_flags: Option<String>,
    pub build: bool,
    pub run: bool,
    pub report: Option<PathBuf>,
}

impl RunOptions {
    /// Neither `--build` nor `--run` given means "just run".
    fn should_run(&self) -> bool {
        self.run || !self.build
    }
}

/// Execute one invocation end to end and return the process exit code.
///
/// # Errors
///
/// Returns an error string for catalog, build, or report failures; the
/// caller maps those to exit code 1.
pub fn run(options: &RunOptions, cancel: CancelToken) -> Result<i32, String> {
    let mut build_system = NinjaBuild::new(options.out_directory.clone());
    build_system.init_command = options
        .init_command
        .as_ref()
        .map(|cmd| cmd.split_whitespace().map(str::to_owned).collect());
    let mut launcher = ProcessLauncher::new(options.out_directory.clone());
    launcher.device_id = options.device_id.clone();
    run_with(options, &build_system, &launcher, cancel)
}

/// [`run`] with the external collaborators injected (used by tests).
///
/// # Errors
///
/// See [`run`].
pub fn run_with(
    options: &RunOptions,
    build_system: &dyn BuildSystem,
    launcher: &dyn Launcher,
    cancel: CancelToken,
) -> Result<i32, String> {
    let resolution = resolve_targets(options)?;

    if let Some(target) = &options.target
        && resolution.single_target_filtered_out()
    {
        // A valid terminal outcome, not a failure.
        eprintln!("\"{target}\" has been filtered; no tests will be run.");
        return Ok(0);
    }

    if options.build {
        build_all(
            build_system,
            &resolution.targets,
            options.ninja_flags.as_deref(),
        )
        .map_err(|e| e.to_string())?;
    }

    if !options.should_run() {
        return Ok(0);
    }

    let runner = ProcessRunner::new(launcher, cancel);
    let outcome = aggregate::run_all(&runner, &resolution.targets);

    if let Some(path) = &options.report {
        let report = to_report(&options.platform, &options.config, &outcome);
        let json = emit_report_json(&report)?;
        std::fs::write(path, json)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    }

    Ok(if outcome.report.overall_success { 0 } else { 1 })
}

/// Load the platform catalog and resolve the final target set.
fn resolve_targets(options: &RunOptions) -> Result<Resolution, String> {
    let catalog = match &options.catalog {
        Some(path) => PlatformCatalog::load(path).map_err(|e| e.to_string())?,
        None => PlatformCatalog::default(),
    };
    Ok(resolve(
        &catalog.targets,
        &catalog.filters,
        &options.config,
        options.target.as_deref(),
    ))
}
