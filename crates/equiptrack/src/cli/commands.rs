//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::form::{AssignmentForm, FieldSpec, FormKind, ProductForm, ReturnForm};
use crate::session::Role;

/// Interactive shell arguments.
#[derive(Debug, Args)]
pub struct ShellCommand {
    /// Read commands from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Keep the session in memory instead of local storage
    #[arg(short, long)]
    pub ephemeral: bool,
}

/// Login arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password (any non-empty value is accepted)
    #[arg(short, long)]
    pub password: String,
}

/// Signup arguments.
#[derive(Debug, Args)]
pub struct SignupCommand {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Password
    #[arg(short, long)]
    pub password: String,

    /// Password confirmation
    #[arg(long)]
    pub confirm: String,

    /// Recorded user type
    #[arg(short = 't', long, value_enum, default_value = "user")]
    pub user_type: UserTypeArg,
}

/// Whoami arguments.
#[derive(Debug, Args)]
pub struct WhoAmICommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Fields arguments.
#[derive(Debug, Args)]
pub struct FieldsCommand {
    /// Which form to describe
    #[arg(value_enum)]
    pub form: FormArg,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// User type argument for signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UserTypeArg {
    /// Administrator
    Admin,
    /// Regular user
    #[default]
    User,
}

impl From<UserTypeArg> for Role {
    fn from(arg: UserTypeArg) -> Self {
        match arg {
            UserTypeArg::Admin => Self::Admin,
            UserTypeArg::User => Self::User,
        }
    }
}

/// Entry form selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormArg {
    /// The new product form
    Product,
    /// The assignment form
    Assignment,
    /// The return form
    Return,
}

impl FormArg {
    /// Title of the selected form.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Product => ProductForm::TITLE,
            Self::Assignment => AssignmentForm::TITLE,
            Self::Return => ReturnForm::TITLE,
        }
    }

    /// Fields of the selected form.
    #[must_use]
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Product => ProductForm::fields(),
            Self::Assignment => AssignmentForm::fields(),
            Self::Return => ReturnForm::fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_arg_conversion() {
        assert_eq!(Role::from(UserTypeArg::Admin), Role::Admin);
        assert_eq!(Role::from(UserTypeArg::User), Role::User);
        assert_eq!(UserTypeArg::default(), UserTypeArg::User);
    }

    #[test]
    fn test_form_arg_fields() {
        assert_eq!(FormArg::Product.fields().len(), 17);
        assert_eq!(FormArg::Assignment.fields().len(), 12);
        assert_eq!(FormArg::Return.fields().len(), 8);
        assert_eq!(FormArg::Return.title(), "Return Product");
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
