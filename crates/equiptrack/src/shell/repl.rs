//! Line-oriented command loop over an [`App`].

use std::fmt;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::listing::OutputFormat;
use crate::notification::Notification;
use crate::session::{GateDecision, Role, SignupRequest};
use crate::storage::KeyValueStore;
use crate::store::SubscriptionId;

use super::{App, Navigation, View};

const HELP: &str = "\
Session:
  login <email> <password>                       sign in
  signup <name> <email> <password> <confirm> [admin|user]
  forgot <email>                                 request a password reset
  logout                                         sign out
  whoami                                         show the signed-in user
Navigation:
  go <view>      dashboard, new-product, assign-product, return-product,
                 view-database, login (routes like /new-product work too)
  back           return to the dashboard
Forms:
  fields         list the current form's fields
  set <field> <value...>
  show           show the current draft
  submit         save the draft
  clear          reset the draft
Database:
  table <products|assignments|returns>
  list [table|plain|json]
  stats          record counts
Other:
  help           this text
  quit, exit     leave the shell
Values containing spaces can be wrapped in double quotes.";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login { email: String, password: String },
    Signup(SignupArgs),
    Forgot { email: String },
    Logout,
    WhoAmI,
    Go(View),
    Back,
    Fields,
    Set { field: String, value: String },
    Show,
    Submit,
    Clear,
    Table(String),
    List(OutputFormat),
    Stats,
    Quit,
}

/// Arguments of `signup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub role: Role,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] for unknown commands or wrong arguments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Ok(None);
        };
        if name.starts_with('#') {
            return Ok(None);
        }

        let command = match (name.to_ascii_lowercase().as_str(), args) {
            ("help" | "?", _) => Self::Help,
            ("login", [email, password]) => Self::Login {
                email: email.clone(),
                password: password.clone(),
            },
            ("login", _) => return usage("login <email> <password>"),
            ("signup", [name, email, password, confirm, rest @ ..]) if rest.len() <= 1 => {
                let role = match rest.first() {
                    Some(role) => role.parse()?,
                    None => Role::User,
                };
                Self::Signup(SignupArgs {
                    name: name.clone(),
                    email: email.clone(),
                    password: password.clone(),
                    confirm: confirm.clone(),
                    role,
                })
            }
            ("signup", _) => {
                return usage("signup <name> <email> <password> <confirm> [admin|user]")
            }
            ("forgot", [email]) => Self::Forgot {
                email: email.clone(),
            },
            ("forgot", _) => return usage("forgot <email>"),
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::WhoAmI,
            ("go", [target]) => Self::Go(target.parse()?),
            ("go", _) => return usage("go <view>"),
            ("back", []) => Self::Back,
            ("fields", []) => Self::Fields,
            ("set", [field, value @ ..]) => Self::Set {
                field: field.clone(),
                value: value.join(" "),
            },
            ("set", []) => return usage("set <field> <value...>"),
            ("show", []) => Self::Show,
            ("submit", []) => Self::Submit,
            ("clear", []) => Self::Clear,
            ("table", [table]) => Self::Table(table.clone()),
            ("table", _) => return usage("table <products|assignments|returns>"),
            ("list", []) => Self::List(OutputFormat::Table),
            ("list", [format]) => Self::List(parse_format(format)?),
            ("list", _) => return usage("list [table|plain|json]"),
            ("stats", []) => Self::Stats,
            ("quit" | "exit", []) => Self::Quit,
            ("logout" | "whoami" | "back" | "fields" | "show" | "submit" | "clear" | "stats"
            | "quit" | "exit", _) => {
                return Err(Error::Usage(format!("{name} takes no arguments")));
            }
            _ => {
                return Err(Error::Usage(format!(
                    "unknown command '{name}', try 'help'"
                )))
            }
        };
        Ok(Some(command))
    }
}

fn usage<T>(text: &str) -> Result<T> {
    Err(Error::Usage(text.to_string()))
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    match format.to_ascii_lowercase().as_str() {
        "table" => Ok(OutputFormat::Table),
        "plain" => Ok(OutputFormat::Plain),
        "json" => Ok(OutputFormat::Json),
        _ => usage("list [table|plain|json]"),
    }
}

/// Split a line on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return usage("unterminated quote");
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive shell reading commands from `R` and writing to `W`.
pub struct Shell<S, R, W> {
    app: App<S>,
    input: R,
    output: W,
    notices: Arc<Mutex<Vec<String>>>,
    subscription: SubscriptionId,
    interactive: bool,
}

impl<S: KeyValueStore, R: BufRead, W: Write> Shell<S, R, W> {
    /// Create a shell that prints a prompt before each command.
    pub fn new(app: App<S>, input: R, output: W) -> Self {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notices);
        let subscription = app.store().subscribe(move |event| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(format!("{}: {} record(s)", event.collection, event.len));
        });
        Self {
            app,
            input,
            output,
            notices,
            subscription,
            interactive: true,
        }
    }

    /// Read commands from a script: no prompt unless commands are echoed.
    #[must_use]
    pub fn scripted(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// The application state.
    pub fn app(&self) -> &App<S> {
        &self.app
    }

    /// Run until end of input or `quit`.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    /// Command errors are printed and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;

        let prompt = self.app.config().shell.prompt.clone();
        let echo = self.app.config().shell.echo_commands;
        let mut line = String::new();
        loop {
            if self.interactive {
                write!(self.output, "{prompt}")?;
                self.output.flush()?;
            }
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            if echo {
                writeln!(self.output, "{prompt}{}", line.trim_end())?;
            }
            if self.execute(&line)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Land on the dashboard, or on login when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if output cannot be written.
    pub fn start(&mut self) -> Result<()> {
        writeln!(self.output, "equiptrack: type 'help' for commands")?;
        match self.app.navigate(View::Dashboard) {
            Ok(navigation) => self.show_navigation(navigation),
            Err(err) => self.report(&err),
        }
    }

    /// Run one line, printing its output and any errors.
    ///
    /// # Errors
    ///
    /// Returns an error only if output cannot be written.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let result = Command::parse(line).and_then(|command| match command {
            Some(command) => self.dispatch(command),
            None => Ok(Flow::Continue),
        });
        let flow = match result {
            Ok(flow) => flow,
            Err(err) => {
                self.report(&err)?;
                Flow::Continue
            }
        };
        self.flush_notices()?;
        Ok(flow)
    }

    fn dispatch(&mut self, command: Command) -> Result<Flow> {
        debug!(?command, "shell command");
        match command {
            Command::Help => writeln!(self.output, "{HELP}")?,
            Command::Login { email, password } => {
                let (_, notification) = self.app.login(&email, &password)?;
                self.notify(&notification)?;
                self.show_screen()?;
            }
            Command::Signup(args) => {
                let (_, notification) = self.app.signup(SignupRequest {
                    name: args.name,
                    email: args.email,
                    password: args.password,
                    confirm_password: args.confirm,
                    user_type: args.role,
                })?;
                self.notify(&notification)?;
                self.show_screen()?;
            }
            Command::Forgot { email } => {
                let notification = self.app.forgot_password(&email)?;
                self.notify(&notification)?;
            }
            Command::Logout => {
                let notification = self.app.logout()?;
                self.notify(&notification)?;
                self.show_screen()?;
            }
            Command::WhoAmI => match self.app.current_user()? {
                Some(user) => writeln!(
                    self.output,
                    "{} <{}> ({})",
                    user.display_name(),
                    user.email,
                    user.role
                )?,
                None => writeln!(self.output, "Not signed in")?,
            },
            Command::Go(view) => {
                let navigation = self.app.navigate(view)?;
                self.show_navigation(navigation)?;
            }
            Command::Back => {
                let navigation = self.app.navigate(View::Dashboard)?;
                self.show_navigation(navigation)?;
            }
            Command::Fields => {
                for spec in self.app.fields()? {
                    let required = if spec.required { " (required)" } else { "" };
                    writeln!(
                        self.output,
                        "  {:<24} {:<24} {}{required}",
                        spec.id, spec.label, spec.input
                    )?;
                }
            }
            Command::Set { field, value } => self.app.set_field(&field, &value)?,
            Command::Show => {
                let draft = self.app.draft()?;
                for (spec, value) in draft.iter() {
                    writeln!(self.output, "  {:<24} {value}", spec.id)?;
                }
            }
            Command::Submit => {
                let (id, notification) = self.app.submit()?;
                self.notify(&notification)?;
                writeln!(self.output, "Saved as record {id}")?;
            }
            Command::Clear => {
                self.app.clear_form()?;
                writeln!(self.output, "Form cleared")?;
            }
            Command::Table(selector) => {
                if self.enter_database()? {
                    let table = self.app.select_table(&selector);
                    writeln!(self.output, "{}", table.to_text().trim_end())?;
                }
            }
            Command::List(format) => {
                if self.enter_database()? {
                    let listing = self.app.list(format)?;
                    writeln!(self.output, "{}", listing.trim_end())?;
                }
            }
            Command::Stats => match self.app.gate().check()? {
                GateDecision::Allow(_) => {
                    let counts = self.app.store().counts();
                    writeln!(
                        self.output,
                        "products: {}, assignments: {}, returns: {}",
                        counts.products, counts.assignments, counts.returns
                    )?;
                }
                GateDecision::Redirect(_) => {
                    writeln!(self.output, "Please sign in to view stats.")?;
                }
            },
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Switch to the database view if needed. Returns `false` on redirect.
    fn enter_database(&mut self) -> Result<bool> {
        if self.app.view() == View::ViewDatabase {
            return Ok(true);
        }
        let navigation = self.app.navigate(View::ViewDatabase)?;
        if let Navigation::Redirected { .. } = navigation {
            self.show_navigation(navigation)?;
            return Ok(false);
        }
        Ok(true)
    }

    fn show_navigation(&mut self, navigation: Navigation) -> Result<()> {
        if let Navigation::Redirected { requested, .. } = navigation {
            writeln!(self.output, "Please sign in to open {requested}.")?;
        }
        self.show_screen()
    }

    fn show_screen(&mut self) -> Result<()> {
        let screen = self.app.screen()?;
        writeln!(self.output, "{screen}")?;
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) -> Result<()> {
        writeln!(self.output, "{notification}")?;
        Ok(())
    }

    fn report(&mut self, err: &Error) -> Result<()> {
        if err.is_validation_error() {
            let notification = Notification::destructive("Error", err.to_string())
                .with_dismiss_after(self.app.config().dismiss_after());
            self.notify(&notification)
        } else {
            warn!(error = %err, "command failed");
            writeln!(self.output, "error: {err}")?;
            Ok(())
        }
    }

    fn flush_notices(&mut self) -> Result<()> {
        let notices: Vec<String> = std::mem::take(
            &mut *self
                .notices
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for notice in notices {
            writeln!(self.output, "{notice}")?;
        }
        Ok(())
    }
}

impl<S, R, W> fmt::Debug for Shell<S, R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("subscription", &self.subscription)
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl<S, R, W> Drop for Shell<S, R, W> {
    fn drop(&mut self) {
        self.app.store.unsubscribe(self.subscription);
    }
}
