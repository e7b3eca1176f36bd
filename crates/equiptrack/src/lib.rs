//! `equiptrack` - Equipment register for an electrical department
//!
//! This library holds the in-memory record store for products, assignments
//! and returns, the entry forms that feed it, the listing view that reads
//! it, and the cosmetic session gate in front of all of them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod listing;
pub mod logging;
pub mod notification;
pub mod record;
pub mod session;
pub mod shell;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{AssignmentForm, EntryForm, FormKind, ProductForm, ReturnForm};
pub use listing::{ListingView, OutputFormat, TableName};
pub use logging::init_logging;
pub use notification::Notification;
pub use record::{Assignment, Product, RecordId, Return};
pub use session::{GateDecision, Role, SessionGate, UserRecord};
pub use shell::{App, Shell, View};
pub use storage::{KeyValueStore, LocalStorage, MemoryStorage};
pub use store::{RecordStore, StoreEvent};
