use apkdeploy_config::DeployConfig;
use apkdeploy_engine::{Engine, plan};
use apkdeploy_env::ProcessEnv;
use apkdeploy_error::Result;
use apkdeploy_export::{EnvmanSink, export_failed_status};
use apkdeploy_logging::Logger;
use apkdeploy_schema::RunOutcome;
use apkdeploy_upload::HttpUploader;
use clap::Parser;
use std::ffi::OsString;
use std::process::ExitCode;

/// Every input is read from the environment; there are no flags.
#[derive(Parser, Debug)]
#[command(name = "apkdeploy", version)]
#[command(
    about = "Upload Android packages to a build-distribution service and publish the resulting URLs.",
    long_about = None
)]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();

    let config = match DeployConfig::from_env(&ProcessEnv) {
        Ok(config) => config,
        Err(err) => {
            Logger::default().error(&err);
            return exit_code(err.exit_code());
        }
    };

    let log = Logger::new(config.logging.clone());
    config.print(&log);

    match deploy(&config, &log) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => exit_code(err.exit_code()),
    }
}

fn deploy(config: &DeployConfig, log: &Logger) -> Result<RunOutcome> {
    // Required fields are checked as entered; normalization is for the wire.
    let targets = plan(&config.paths, &config.metadata, log).inspect_err(|err| log.error(err))?;
    let metadata = config.wire_metadata();

    let sink = EnvmanSink::with_command(config.envman.as_str(), Vec::<OsString>::new());
    let uploader = HttpUploader::new(config.api_base.as_str(), log).inspect_err(|err| {
        log.error(err);
        export_failed_status(&sink, log);
    })?;

    Engine::new(&uploader, &sink, log).run(&targets, &metadata)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
