//! `equiptrack` - CLI for the equipment register
//!
//! Runs the interactive shell and a handful of one-shot session and
//! configuration commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use equiptrack::cli::{Cli, Command, ConfigCommand, FormArg, ShellCommand, SignupCommand};
use equiptrack::session::SignupRequest;
use equiptrack::{
    init_logging, App, Config, KeyValueStore, LocalStorage, MemoryStorage, RecordStore,
    SessionGate, Shell,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // `config validate` reports problems instead of failing to start
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        handle_validate(file.clone().or_else(|| cli.config.clone()));
        return Ok(());
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Shell(cmd) => handle_shell(config, &cmd),
        Command::Login(cmd) => {
            let mut gate = open_gate(&config)?;
            let (user, notification) = gate.login(&cmd.email, &cmd.password)?;
            println!("{notification}");
            println!("Signed in as {} ({})", user.email, user.role);
            Ok(())
        }
        Command::Signup(cmd) => handle_signup(&config, cmd),
        Command::Logout => {
            let mut gate = open_gate(&config)?;
            println!("{}", gate.logout()?);
            Ok(())
        }
        Command::WhoAmI(cmd) => {
            let gate = open_gate(&config)?;
            match gate.current_user()? {
                Some(user) if cmd.json => println!("{}", serde_json::to_string_pretty(&user)?),
                Some(user) => println!("{} <{}> ({})", user.display_name(), user.email, user.role),
                None if cmd.json => println!("null"),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::Fields(cmd) => {
            handle_fields(cmd.form);
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_gate(config: &Config) -> Result<SessionGate<LocalStorage>> {
    let path = config.storage_path();
    let storage = LocalStorage::open(&path)
        .with_context(|| format!("failed to open local storage at {}", path.display()))?;
    Ok(SessionGate::with_key(storage, config.session.storage_key.clone())
        .with_dismiss_after(config.dismiss_after()))
}

fn handle_shell(config: Config, cmd: &ShellCommand) -> Result<()> {
    if cmd.ephemeral {
        run_shell(config, MemoryStorage::new(), cmd)
    } else {
        let path = config.storage_path();
        let storage = LocalStorage::open(&path)
            .with_context(|| format!("failed to open local storage at {}", path.display()))?;
        run_shell(config, storage, cmd)
    }
}

fn run_shell<S: KeyValueStore>(config: Config, storage: S, cmd: &ShellCommand) -> Result<()> {
    let store = Arc::new(RecordStore::new());
    let app = App::new(store, storage, config);

    match &cmd.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            Shell::new(app, BufReader::new(file), io::stdout().lock())
                .scripted()
                .run()?;
        }
        None => {
            Shell::new(app, io::stdin().lock(), io::stdout().lock()).run()?;
        }
    }
    Ok(())
}

fn handle_signup(config: &Config, cmd: SignupCommand) -> Result<()> {
    let mut gate = open_gate(config)?;
    let (user, notification) = gate.signup(SignupRequest {
        name: cmd.name,
        email: cmd.email,
        password: cmd.password,
        confirm_password: cmd.confirm,
        user_type: cmd.user_type.into(),
    })?;
    println!("{notification}");
    println!("Signed in as {} ({})", user.email, user.role);
    Ok(())
}

fn handle_fields(form: FormArg) {
    println!("{}", form.title());
    for spec in form.fields() {
        let required = if spec.required { "required" } else { "optional" };
        println!(
            "  {:<24} {:<24} {:<16} {required}",
            spec.id,
            spec.label,
            spec.input.to_string()
        );
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Session]");
                println!("  Storage path:       {}", config.storage_path().display());
                println!("  Storage key:        {}", config.session.storage_key);
                println!();
                println!("[Listing]");
                println!("  Default table:      {}", config.default_table());
                println!("  Currency symbol:    {}", config.listing.currency_symbol);
                println!("  Placeholder text:   {}", config.listing.placeholder_text);
                println!();
                println!("[Notifications]");
                println!(
                    "  Dismiss after (ms): {}",
                    config.notifications.dismiss_after_ms
                );
                println!();
                println!("[Shell]");
                println!("  Prompt:             {:?}", config.shell.prompt);
                println!("  Echo commands:      {}", config.shell.echo_commands);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            handle_validate(file);
        }
    }
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
}
