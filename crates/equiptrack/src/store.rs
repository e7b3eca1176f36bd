//! In-memory record store.
//!
//! The store is the single owner of the three record collections. Forms
//! add to it, the listing view reads from it, and nothing else touches the
//! collections. It is built once per session and shared by `Arc`.
//!
//! - `add_product` / `add_assignment` / `add_return` append one record,
//!   assign its identifier, and notify every subscriber before returning.
//! - `products` / `assignments` / `returns` return snapshots in insertion
//!   order.
//! - `subscribe` / `unsubscribe` manage change handlers.
//!
//! Collections are append-only. Nothing is persisted; dropping the store
//! drops the records.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::record::{
    Assignment, AssignmentFields, Product, ProductFields, RecordId, Return, ReturnFields,
};

/// Date format used for store-stamped dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for stamping return dates.
pub trait Clock: Send + Sync {
    /// The current UTC calendar day.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock that always reports the same day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Which collection a change happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// The products collection.
    Products,
    /// The assignments collection.
    Assignments,
    /// The returns collection.
    Returns,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Products => write!(f, "products"),
            Self::Assignments => write!(f, "assignments"),
            Self::Returns => write!(f, "returns"),
        }
    }
}

/// A change notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    /// The collection that grew.
    pub collection: Collection,
    /// Identifier of the new record.
    pub id: RecordId,
    /// Length of the collection after the append.
    pub len: usize,
}

/// Identifier returned by [`RecordStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback type for store change notifications.
pub type ChangeHandler = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Collection sizes, for dashboards and status lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    /// Number of products.
    pub products: usize,
    /// Number of assignments.
    pub assignments: usize,
    /// Number of returns.
    pub returns: usize,
}

#[derive(Default)]
struct Collections {
    products: Vec<Product>,
    assignments: Vec<Assignment>,
    returns: Vec<Return>,
}

/// Shared in-memory store for products, assignments and returns.
///
/// Handlers run synchronously on the thread that performed the mutation,
/// after the record is visible to readers. A handler may read from the
/// store but must not add records from inside the callback.
pub struct RecordStore {
    collections: RwLock<Collections>,
    handlers: Mutex<Vec<(SubscriptionId, ChangeHandler)>>,
    next_record_id: AtomicU64,
    next_subscription_id: AtomicU64,
    clock: Box<dyn Clock>,
}

impl RecordStore {
    /// Create an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty store using the given clock for return dates.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            collections: RwLock::new(Collections::default()),
            handlers: Mutex::new(Vec::new()),
            next_record_id: AtomicU64::new(1),
            next_subscription_id: AtomicU64::new(1),
            clock: Box::new(clock),
        }
    }

    /// Add a product and return the stored record.
    pub fn add_product(&self, fields: ProductFields) -> Product {
        let product = Product {
            id: self.next_id(),
            fields,
        };
        let len = {
            let mut collections = self.write();
            collections.products.push(product.clone());
            collections.products.len()
        };
        info!(id = %product.id, serial = %product.fields.product_serial_number, "product added");
        self.notify(Collection::Products, product.id, len);
        product
    }

    /// Add an assignment and return the stored record.
    pub fn add_assignment(&self, fields: AssignmentFields) -> Assignment {
        let assignment = Assignment {
            id: self.next_id(),
            fields,
        };
        let len = {
            let mut collections = self.write();
            collections.assignments.push(assignment.clone());
            collections.assignments.len()
        };
        info!(
            id = %assignment.id,
            serial = %assignment.fields.product_serial_no,
            employee = %assignment.fields.employee_id,
            "assignment added"
        );
        self.notify(Collection::Assignments, assignment.id, len);
        assignment
    }

    /// Add a return and return the stored record.
    ///
    /// The return date is always today's UTC date; a date in `fields` is
    /// discarded.
    pub fn add_return(&self, fields: ReturnFields) -> Return {
        if let Some(supplied) = fields.return_date.as_deref() {
            debug!(supplied, "ignoring caller-supplied return date");
        }
        let return_date = self.clock.today().format(DATE_FORMAT).to_string();
        let record = Return::from_fields(self.next_id(), fields, return_date);
        let len = {
            let mut collections = self.write();
            collections.returns.push(record.clone());
            collections.returns.len()
        };
        info!(
            id = %record.id,
            serial = %record.product_serial_no,
            date = %record.return_date,
            "return added"
        );
        self.notify(Collection::Returns, record.id, len);
        record
    }

    /// Snapshot of all products in insertion order.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    /// Snapshot of all assignments in insertion order.
    #[must_use]
    pub fn assignments(&self) -> Vec<Assignment> {
        self.read().assignments.clone()
    }

    /// Snapshot of all returns in insertion order.
    #[must_use]
    pub fn returns(&self) -> Vec<Return> {
        self.read().returns.clone()
    }

    /// Current size of each collection.
    #[must_use]
    pub fn counts(&self) -> StoreCounts {
        let collections = self.read();
        StoreCounts {
            products: collections.products.len(),
            assignments: collections.assignments.len(),
            returns: collections.returns.len(),
        }
    }

    /// Register a handler called after every record is added.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        self.handlers_mut().push((id, Arc::new(handler)));
        debug!(subscription = id.0, "store subscriber added");
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        before != handlers.len()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.handlers_mut().len()
    }

    fn next_id(&self) -> RecordId {
        RecordId::new(self.next_record_id.fetch_add(1, Ordering::Relaxed))
    }

    fn notify(&self, collection: Collection, id: RecordId, len: usize) {
        let event = StoreEvent {
            collection,
            id,
            len,
        };
        // Clone the handler list so callbacks run without holding the lock.
        let handlers: Vec<ChangeHandler> = self
            .handlers_mut()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }

    // Poisoned locks are recovered; the collections stay valid after a
    // panicking subscriber.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn handlers_mut(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, ChangeHandler)>> {
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("counts", &self.counts())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
