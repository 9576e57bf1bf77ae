//! cookiecutter-runner's entry point.
//! Parses the command line, sets up logging and runs the stage, generate
//! and install flow.

use cookiecutter_runner::{
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    logger::init_logger,
    orchestrator::run,
    runner::{CookiecutterGenerator, MakeInstaller},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = execute(args) {
        default_error_handler(err);
    }
}

fn execute(args: Args) -> Result<()> {
    let options = args.run_options();
    let generator = CookiecutterGenerator::new(args.extra_context());
    let installer = MakeInstaller::default();

    let report = run(&options, &generator, &installer)?;
    if options.stage_only {
        println!("Template staged in {}.", report.staged_dir.display());
        return Ok(());
    }
    for project in &report.projects {
        println!("Generated: '{}'", project.display());
    }
    Ok(())
}
