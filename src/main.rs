use std::path::PathBuf;

use clap::Parser;

use utr::cancel::CancelToken;
use utr::cli::commands::{self, RunOptions};

#[derive(Parser)]
#[command(name = "utr", about = "utr — cross-platform unit test runner", version)]
struct Cli {
    /// Build the test binaries
    #[arg(short, long)]
    build: bool,

    /// Run the test binaries (default if neither --build nor --run given)
    #[arg(short, long)]
    run: bool,

    /// Platform the tests run on, e.g. "linux-x64x11"
    #[arg(long)]
    platform: String,

    /// Build configuration of the binaries, e.g. "devel" or "qa"
    #[arg(long, default_value = "devel")]
    config: String,

    /// Device to run the tests on, for launchers that need one
    #[arg(long, alias = "device_id")]
    device_id: Option<String>,

    /// Run only this test target
    #[arg(long, alias = "target_name")]
    target: Option<String>,

    /// Build output directory containing the test binaries
    #[arg(long, alias = "out_directory")]
    out_directory: Option<PathBuf>,

    /// Platform catalog JSON with default targets and filter rules
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Build-system initialization command, e.g. the GYP generation step
    #[arg(long, alias = "init_command")]
    init_command: Option<String>,

    /// Flags to pass to the ninja build system, exactly as you would
    /// on the command line between a set of double quotation marks
    #[arg(long, alias = "ninja_flags")]
    ninja_flags: Option<String>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            eprintln!("warning: failed to install interrupt handler: {e}");
        }
    }

    let out_directory = cli.out_directory.unwrap_or_else(|| {
        PathBuf::from("out").join(format!("{}_{}", cli.platform, cli.config))
    });

    let options = RunOptions {
        platform: cli.platform,
        config: cli.config,
        device_id: cli.device_id,
        target: cli.target,
        out_directory,
        catalog: cli.catalog,
        init_command: cli.init_command,
        ninja_flags: cli.ninja_flags,
        build: cli.build,
        run: cli.run,
        report: cli.report,
    };

    match commands::run(&options, cancel) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
