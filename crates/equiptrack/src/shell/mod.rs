//! Views, navigation and the application state behind the command shell.
//!
//! [`App`] owns everything a running session needs: the shared record
//! store, the session gate, the three entry forms and the listing view.
//! Navigating to a protected view runs the gate first; without a signed-in
//! user the app lands on the login view and nothing protected is shown.

mod repl;

pub use repl::Shell;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::{
    AssignmentForm, Draft, EntryForm, FieldSpec, FormKind, FormState, ProductForm, ReturnForm,
};
use crate::listing::{ListingView, OutputFormat, RenderedTable};
use crate::notification::Notification;
use crate::record::RecordId;
use crate::session::{GateDecision, SessionGate, SignupRequest, UserRecord};
use crate::storage::KeyValueStore;
use crate::store::{RecordStore, StoreCounts};

/// A screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Sign in, sign up and password reset.
    Login,
    /// Landing page after sign in.
    Dashboard,
    /// Product entry form.
    NewProduct,
    /// Assignment entry form.
    AssignProduct,
    /// Return entry form.
    ReturnProduct,
    /// Read-only tables.
    ViewDatabase,
}

impl View {
    /// Every view, login first.
    pub const ALL: [View; 6] = [
        Self::Login,
        Self::Dashboard,
        Self::NewProduct,
        Self::AssignProduct,
        Self::ReturnProduct,
        Self::ViewDatabase,
    ];

    /// Route of the view.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/",
            Self::NewProduct => "/new-product",
            Self::AssignProduct => "/assign-product",
            Self::ReturnProduct => "/return-product",
            Self::ViewDatabase => "/view-database",
        }
    }

    /// Short name used in messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Dashboard => "dashboard",
            Self::NewProduct => "new-product",
            Self::AssignProduct => "assign-product",
            Self::ReturnProduct => "return-product",
            Self::ViewDatabase => "view-database",
        }
    }

    /// Look a view up by its exact route.
    #[must_use]
    pub fn from_route(route: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.route() == route)
    }

    /// Whether the session gate guards this view.
    #[must_use]
    pub fn is_protected(self) -> bool {
        self != Self::Login
    }

    /// Whether this view hosts an entry form.
    #[must_use]
    pub fn has_form(self) -> bool {
        matches!(
            self,
            Self::NewProduct | Self::AssignProduct | Self::ReturnProduct
        )
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = Error;

    /// Accepts routes (`/new-product`), names (`new-product`) and a few
    /// aliases, ignoring case and separators.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(view) = Self::from_route(s.trim()) {
            return Ok(view);
        }
        let key: String = s
            .trim()
            .trim_start_matches('/')
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "login" | "signin" => Ok(Self::Login),
            "" | "dashboard" | "home" => Ok(Self::Dashboard),
            "newproduct" | "product" => Ok(Self::NewProduct),
            "assignproduct" | "assign" | "assignment" => Ok(Self::AssignProduct),
            "returnproduct" | "return" => Ok(Self::ReturnProduct),
            "viewdatabase" | "database" | "db" => Ok(Self::ViewDatabase),
            _ => Err(Error::UnknownView(s.to_string())),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The requested view is now current.
    Shown(View),
    /// The gate sent the user elsewhere.
    Redirected {
        /// What was asked for.
        requested: View,
        /// Where the app ended up.
        to: View,
    },
}

impl Navigation {
    /// The view that is current after navigating.
    #[must_use]
    pub fn current(self) -> View {
        match self {
            Self::Shown(view) | Self::Redirected { to: view, .. } => view,
        }
    }
}

/// A dashboard tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSection {
    pub title: &'static str,
    pub description: &'static str,
    pub view: View,
}

/// The tiles on the dashboard, in display order.
pub const DASHBOARD_SECTIONS: [DashboardSection; 4] = [
    DashboardSection {
        title: "New Product",
        description: "Add new products to the inventory system",
        view: View::NewProduct,
    },
    DashboardSection {
        title: "Assign Product",
        description: "Assign products to employees or departments",
        view: View::AssignProduct,
    },
    DashboardSection {
        title: "Return Product",
        description: "Process product returns and updates",
        view: View::ReturnProduct,
    },
    DashboardSection {
        title: "View Database",
        description: "Access and manage the complete product database",
        view: View::ViewDatabase,
    },
];

/// Contents of the dashboard for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// The signed-in user.
    pub user: UserRecord,
    /// Live collection sizes.
    pub stats: StoreCounts,
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Welcome back, {}!", self.user.display_name())?;
        writeln!(
            f,
            "You have full access to all system functions and features."
        )?;
        writeln!(f)?;
        for section in &DASHBOARD_SECTIONS {
            writeln!(
                f,
                "  {:<16} {:<50} (go {})",
                section.title,
                section.description,
                section.view.name()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total Products:    {}", self.stats.products)?;
        writeln!(f, "Assigned Products: {}", self.stats.assignments)?;
        write!(f, "Pending Returns:   {}", self.stats.returns)
    }
}

/// An entry form as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormScreen {
    pub title: &'static str,
    pub submit_label: &'static str,
    pub state: FormState,
    pub entries: Vec<(FieldSpec, String)>,
}

impl FormScreen {
    fn of<K: FormKind>(form: &EntryForm<K>) -> Self {
        Self {
            title: K::TITLE,
            submit_label: K::SUBMIT_LABEL,
            state: form.state(),
            entries: form
                .draft()
                .iter()
                .map(|(spec, value)| (*spec, value.to_string()))
                .collect(),
        }
    }
}

impl fmt::Display for FormScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for (spec, value) in &self.entries {
            let marker = if spec.required { "*" } else { " " };
            if value.is_empty() {
                let hint = spec.placeholder.unwrap_or_default();
                writeln!(f, "  {marker} {:<24} [{}] {hint}", spec.id, spec.input)?;
            } else {
                writeln!(f, "  {marker} {:<24} = {value}", spec.id)?;
            }
        }
        write!(f, "Use 'set <field> <value>' and 'submit' ({}).", self.submit_label)
    }
}

/// What the current view displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// The login prompt.
    Login,
    /// The dashboard.
    Dashboard(Dashboard),
    /// One of the entry forms.
    Form(FormScreen),
    /// The selected table.
    Database(RenderedTable),
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(
                f,
                "Sign in with 'login <email> <password>' or create an account with 'signup'."
            ),
            Self::Dashboard(dashboard) => write!(f, "{dashboard}"),
            Self::Form(form) => write!(f, "{form}"),
            Self::Database(table) => write!(f, "{}", table.to_text().trim_end()),
        }
    }
}

/// Runs `$body` against the form of the current view.
macro_rules! with_form {
    ($app:expr, $form:ident => $body:expr) => {
        match $app.view {
            View::NewProduct => {
                let $form = &mut $app.product_form;
                $body
            }
            View::AssignProduct => {
                let $form = &mut $app.assignment_form;
                $body
            }
            View::ReturnProduct => {
                let $form = &mut $app.return_form;
                $body
            }
            other => Err(Error::NoActiveForm { view: other.name() }),
        }
    };
}

/// Application state for one session.
#[derive(Debug)]
pub struct App<S> {
    store: Arc<RecordStore>,
    gate: SessionGate<S>,
    product_form: EntryForm<ProductForm>,
    assignment_form: EntryForm<AssignmentForm>,
    return_form: EntryForm<ReturnForm>,
    listing: ListingView,
    config: Config,
    view: View,
}

impl<S: KeyValueStore> App<S> {
    /// Create the app on the login view.
    pub fn new(store: Arc<RecordStore>, storage: S, config: Config) -> Self {
        let gate = SessionGate::with_key(storage, config.session.storage_key.clone())
            .with_dismiss_after(config.dismiss_after());
        let listing = ListingView::new(&config.listing);
        Self {
            store,
            gate,
            product_form: EntryForm::new(),
            assignment_form: EntryForm::new(),
            return_form: EntryForm::new(),
            listing,
            config,
            view: View::Login,
        }
    }

    /// The current view.
    pub fn view(&self) -> View {
        self.view
    }

    /// The shared record store.
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The session gate.
    pub fn gate(&self) -> &SessionGate<S> {
        &self.gate
    }

    /// The listing view.
    pub fn listing(&self) -> &ListingView {
        &self.listing
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Switch views, running the gate for protected ones.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session entry cannot be read.
    pub fn navigate(&mut self, view: View) -> Result<Navigation> {
        if view.is_protected() {
            if let GateDecision::Redirect(to) = self.gate.check()? {
                info!(requested = %view, to = %to, "not signed in, redirecting");
                self.view = to;
                return Ok(Navigation::Redirected {
                    requested: view,
                    to,
                });
            }
        }
        debug!(view = %view, "navigated");
        self.view = view;
        Ok(Navigation::Shown(view))
    }

    /// Sign in and go to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or cannot be stored.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(UserRecord, Notification)> {
        let signed_in = self.gate.login(email, password)?;
        self.navigate(View::Dashboard)?;
        Ok(signed_in)
    }

    /// Create an account and go to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected or cannot be stored.
    pub fn signup(&mut self, request: SignupRequest) -> Result<(UserRecord, Notification)> {
        let signed_in = self.gate.signup(request)?;
        self.navigate(View::Dashboard)?;
        Ok(signed_in)
    }

    /// Acknowledge a password reset request.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is empty.
    pub fn forgot_password(&self, email: &str) -> Result<Notification> {
        self.gate.forgot_password(email)
    }

    /// Sign out and return to the login view.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session entry cannot be removed.
    pub fn logout(&mut self) -> Result<Notification> {
        let notification = self.gate.logout()?;
        self.view = View::Login;
        Ok(notification)
    }

    /// The signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session entry cannot be read.
    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        self.gate.current_user()
    }

    /// Render the current view.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session entry cannot be read.
    pub fn screen(&self) -> Result<Screen> {
        Ok(match self.view {
            View::Login => Screen::Login,
            View::Dashboard => match self.gate.current_user()? {
                Some(user) => Screen::Dashboard(Dashboard {
                    user,
                    stats: self.store.counts(),
                }),
                None => Screen::Login,
            },
            View::NewProduct => Screen::Form(FormScreen::of(&self.product_form)),
            View::AssignProduct => Screen::Form(FormScreen::of(&self.assignment_form)),
            View::ReturnProduct => Screen::Form(FormScreen::of(&self.return_form)),
            View::ViewDatabase => Screen::Database(self.listing.render(&self.store)),
        })
    }

    /// Fields of the current view's form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveForm`] outside the form views.
    pub fn fields(&mut self) -> Result<&'static [FieldSpec]> {
        with_form!(self, form => Ok(form.fields()))
    }

    /// Draft of the current view's form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveForm`] outside the form views.
    pub fn draft(&mut self) -> Result<Draft> {
        with_form!(self, form => Ok(form.draft().clone()))
    }

    /// Set a field of the current view's form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveForm`] outside the form views, or the
    /// form's own validation error.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        with_form!(self, form => form.set(name, value))
    }

    /// Clear the current view's form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveForm`] outside the form views.
    pub fn clear_form(&mut self) -> Result<()> {
        with_form!(self, form => {
            form.clear();
            Ok(())
        })
    }

    /// Submit the current view's form into the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveForm`] outside the form views, or
    /// [`Error::MissingField`] if a required field is empty.
    pub fn submit(&mut self) -> Result<(RecordId, Notification)> {
        let dismiss_after = self.config.dismiss_after();
        let store = Arc::clone(&self.store);
        with_form!(self, form => form.submit(&store).map(|submission| {
            (
                submission.record.id,
                submission.notification.with_dismiss_after(dismiss_after),
            )
        }))
    }

    /// Select a table, falling back to products for unknown names.
    pub fn select_table(&mut self, selector: &str) -> RenderedTable {
        self.listing.select_by_name(selector);
        self.listing.render(&self.store)
    }

    /// Format the selected table.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON output cannot be produced.
    pub fn list(&self, format: OutputFormat) -> Result<String> {
        self.listing.format(&self.store, format)
    }
}
