mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::warn;

use cfgpush::push::{self, EXIT_CONFIG_ERROR, EXIT_DEVICE_FAILURE, EXIT_OK};
use cfgpush::{CommandPlan, IntentDocument, Orchestrator, RunConfig, SshSessionFactory};
use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

async fn run(cli: &Cli) -> cfgpush::Result<u8> {
    let config = cli.run_config()?;
    let intents = IntentDocument::load(&config.intent_file, config.resolve_flat_device())?;

    if cli.dry_run {
        return Ok(dry_run(&config, &intents));
    }

    let credentials = cli.credentials()?;
    let orchestrator = Orchestrator::new(SshSessionFactory::new(config.ssh.clone()))
        .with_push_timeout(config.push_timeout());
    let results = orchestrator
        .run(&config.devices, &intents, &credentials)
        .await;

    println!("{}", push::summary_table(&results));
    Ok(push::exit_code(&results))
}

/// Print every roster device's plan. Fails if any plan cannot be built.
fn dry_run(config: &RunConfig, intents: &IntentDocument) -> u8 {
    for device_id in intents.device_ids() {
        if !config.devices.contains(device_id) {
            warn!("{}: intent present but device is not in the roster, ignoring", device_id);
        }
    }

    let mut code = EXIT_OK;
    for (device_id, address) in config.devices.iter() {
        let Some(records) = intents.records(device_id) else {
            println!("! {device_id} ({address}): no intent, skipped\n");
            continue;
        };
        match CommandPlan::build(device_id, records) {
            Ok(plan) => println!("! {device_id} ({address}): {} commands\n{plan}\n", plan.len()),
            Err(e) => {
                eprintln!("{device_id}: {e}");
                code = EXIT_DEVICE_FAILURE;
            }
        }
    }
    code
}
