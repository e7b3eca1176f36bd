//! Command-line interface for equiptrack.
//!
//! This module provides the CLI structure for the `equiptrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, FieldsCommand, FormArg, LoginCommand, ShellCommand, SignupCommand,
    UserTypeArg, WhoAmICommand,
};

/// equiptrack - Equipment register for an electrical department
///
/// Record new products, assign them to employees, log their returns and
/// browse everything from an interactive shell.
#[derive(Debug, Parser)]
#[command(name = "equiptrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive shell
    Shell(ShellCommand),

    /// Sign in and remember the user in local storage
    Login(LoginCommand),

    /// Create an account and sign in
    Signup(SignupCommand),

    /// Forget the signed-in user
    Logout,

    /// Show the signed-in user
    #[command(name = "whoami")]
    WhoAmI(WhoAmICommand),

    /// List the fields of an entry form
    Fields(FieldsCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "equiptrack");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["equiptrack", "logout"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["equiptrack", "-v", "logout"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["equiptrack", "-vv", "logout"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["equiptrack", "-q", "logout"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_shell() {
        let cli = parse(&["equiptrack", "shell", "--script", "demo.txt", "--ephemeral"]);
        let Command::Shell(shell) = cli.command else {
            panic!("expected shell");
        };
        assert_eq!(shell.script, Some(PathBuf::from("demo.txt")));
        assert!(shell.ephemeral);
    }

    #[test]
    fn test_parse_login() {
        let cli = parse(&["equiptrack", "login", "--email", "a@b.c", "--password", "pw"]);
        let Command::Login(login) = cli.command else {
            panic!("expected login");
        };
        assert_eq!(login.email, "a@b.c");
        assert_eq!(login.password, "pw");
    }

    #[test]
    fn test_parse_signup() {
        let cli = parse(&[
            "equiptrack",
            "signup",
            "--name",
            "Jane",
            "--email",
            "jane@x.com",
            "--password",
            "pw",
            "--confirm",
            "pw",
            "--user-type",
            "admin",
        ]);
        let Command::Signup(signup) = cli.command else {
            panic!("expected signup");
        };
        assert_eq!(signup.user_type, UserTypeArg::Admin);
        assert_eq!(signup.confirm, "pw");
    }

    #[test]
    fn test_parse_signup_requires_confirm() {
        let result = Cli::try_parse_from([
            "equiptrack",
            "signup",
            "--name",
            "Jane",
            "--email",
            "jane@x.com",
            "--password",
            "pw",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_logout_and_whoami() {
        assert!(matches!(parse(&["equiptrack", "logout"]).command, Command::Logout));
        let cli = parse(&["equiptrack", "whoami", "--json"]);
        assert!(matches!(cli.command, Command::WhoAmI(WhoAmICommand { json: true })));
    }

    #[test]
    fn test_parse_fields() {
        let cli = parse(&["equiptrack", "fields", "assignment"]);
        let Command::Fields(fields) = cli.command else {
            panic!("expected fields");
        };
        assert_eq!(fields.form, FormArg::Assignment);
        assert!(Cli::try_parse_from(["equiptrack", "fields", "invoice"]).is_err());
    }

    #[test]
    fn test_parse_config() {
        let cli = parse(&["equiptrack", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
        let cli = parse(&["equiptrack", "config", "validate", "--file", "x.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
        assert!(matches!(
            parse(&["equiptrack", "config", "path"]).command,
            Command::Config(ConfigCommand::Path)
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["equiptrack", "-c", "/custom/config.toml", "logout"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
