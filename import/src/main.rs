use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use meshforge_import::{
    CommandContext, FileStore, ImportArgs, ImportModelCommand, ResultStatus, RonModelLoader,
    VERSION,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("meshforge-import v{VERSION}");

    let args = ImportArgs::parse();
    let settings = match args.import_settings() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let context = CommandContext::new(
        Arc::new(RonModelLoader::new()),
        Arc::new(FileStore::new(&args.output_dir)),
    );
    let mut command = ImportModelCommand::new(&args.source, args.location.clone(), settings);
    match command.identity_hash() {
        Ok(hash) => log::debug!("Command identity {hash}"),
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    }

    match runtime.block_on(command.execute(&context)) {
        ResultStatus::Successful => ExitCode::SUCCESS,
        ResultStatus::Failed | ResultStatus::Cancelled => ExitCode::FAILURE,
    }
}
