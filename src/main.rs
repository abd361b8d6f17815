mod cli;
mod paths;
mod settings;
mod state;
mod ui;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ReconcileArgs, StateCommand};
use glue_trigger::{CallbackContext, MemoryService, ResourceModel, TriggerHandler};
use handlerkit::{
    DriveOptions, Handler, HandlerRequest, NoWait, Operation, SleepWait, WaitCallback,
    run_to_completion,
};
use settings::AppConfig;
use state::LocalState;
use std::fs;
use std::io;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Reconcile(args) => reconcile(&args, cli.quiet),
        Command::State(cmd) => state(cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "glue-trigger", &mut io::stdout());
            Ok(())
        }
    }
}

fn reconcile(args: &ReconcileArgs, quiet: bool) -> Result<()> {
    let config = AppConfig::load()?;
    let state_path = LocalState::state_file()?;
    let mut local = LocalState::load_from(&state_path)?;
    let service = MemoryService::from_store(local.store.clone(), config.service.clone());
    let handler = TriggerHandler::new(&service, config.reconcile.clone());

    let operation = Operation::from(args.operation);
    let request = build_request(args, &config)?;

    let (event, invocations) = if args.once {
        let context = match args.context.as_deref() {
            Some(path) => read_context(path)?,
            None => None,
        };
        let event = handler.handle(operation, &request, context);
        if let Some(path) = args.context.as_deref() {
            write_context(path, event.callback_context.as_ref())?;
        }
        (event, 1)
    } else {
        let opts = DriveOptions {
            max_invocations: args.max_invocations,
        };
        let mut wait: Box<dyn WaitCallback> = if args.no_wait {
            Box::new(NoWait)
        } else {
            Box::new(SleepWait)
        };
        run_to_completion(&handler, operation, &request, &opts, wait.as_mut())
            .with_context(|| format!("{operation} did not finish"))?
    };

    // Reads advance deletions too, so the store is saved after every run
    local.commit(service.store(), &state_path)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&event).context("Failed to serialize outcome")?
    );
    if !quiet {
        ui::outcome(&event, invocations);
    }

    if event.is_failed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Request from `--request`, with flags filling in what it leaves out
fn build_request(args: &ReconcileArgs, config: &AppConfig) -> Result<HandlerRequest<ResourceModel>> {
    let mut request: HandlerRequest<ResourceModel> = match &args.request {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read request file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid request JSON in {}", path.display()))?
        }
        None => HandlerRequest::default(),
    };

    if let Some(name) = &args.name {
        request
            .desired_resource_state
            .get_or_insert_with(ResourceModel::default)
            .name = Some(name.clone());
    }
    if let Some(token) = &args.token {
        request.client_request_token.clone_from(token);
    }
    if request.client_request_token.is_empty() {
        if args.once {
            ui::warn("No --token given; generated names will differ between invocations");
        }
        request.client_request_token = format!("local-{}", Utc::now().timestamp_millis());
    }
    if args.next_token.is_some() {
        request.next_token.clone_from(&args.next_token);
    }
    if request.region.is_empty() {
        request.region.clone_from(&config.region);
    }
    if request.aws_account_id.is_empty() {
        request.aws_account_id.clone_from(&config.account_id);
    }
    Ok(request)
}

fn read_context(path: &Path) -> Result<Option<CallbackContext>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    let context = handlerkit::decode(&raw)
        .with_context(|| format!("Invalid context in {}", path.display()))?;
    Ok(Some(context))
}

/// Write the continuation, or remove the file once the operation is over
fn write_context(path: &Path, context: Option<&CallbackContext>) -> Result<()> {
    match context {
        Some(context) => {
            let raw = handlerkit::encode(context)?;
            fs::write(path, raw)
                .with_context(|| format!("Failed to write context file: {}", path.display()))
        }
        None if path.exists() => fs::remove_file(path)
            .with_context(|| format!("Failed to remove context file: {}", path.display())),
        None => Ok(()),
    }
}

fn state(cmd: StateCommand) -> Result<()> {
    let path = LocalState::state_file()?;
    let mut local = LocalState::load_from(&path)?;

    match cmd {
        StateCommand::Show { raw: true } => {
            println!(
                "{}",
                toml::to_string_pretty(&local).context("Failed to serialize state to TOML")?
            );
        }
        StateCommand::Show { raw: false } => {
            ui::header("Local triggers");
            ui::kv("file", &path.display().to_string());
            ui::kv("updated", &local.last_updated.to_rfc3339());
            if local.store.triggers.is_empty() {
                ui::dim("(none)");
            }
            for (name, stored) in &local.store.triggers {
                let kind = stored.snapshot.trigger_type.as_deref().unwrap_or("-");
                ui::kv(name, &format!("{} [{kind}], {} tag(s)", stored.snapshot.state, stored.tags.len()));
            }
        }
        StateCommand::Reset => {
            let count = local.store.triggers.len();
            local.commit(Default::default(), &path)?;
            ui::success(&format!("Removed {count} trigger(s)"));
        }
    }
    Ok(())
}
