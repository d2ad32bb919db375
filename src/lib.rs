//! Admin-side lifecycle client for a mock API server's schema store.
//!
//! The crate models the admin view of the service: a typed HTTP client for
//! the schema endpoints, a controller that turns admin intents into service
//! calls and user-visible outcomes, a transient notification model, and a
//! background monitor that reloads the view once schemas first appear.
//!
//! The rendering host plugs in through [`surface::AdminSurface`]; everything
//! else is host-agnostic.

#[macro_use]
mod macros;

pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod poll;
pub mod service;
pub mod surface;

pub use config::AdminConfig;
pub use controller::{ActionKind, AdminAction, LifecycleController, OperationKind};
pub use error::{AdminError, AdminResult};
pub use notify::{InlineStatus, Notice, NotificationCenter, Severity, StatusRegion};
pub use poll::{PollState, PollingMonitor};
pub use service::{
    DeleteAllOutcome, MediaType, SchemaInfo, SchemaRef, SchemaServiceClient,
    schema_name_from_file,
};
pub use surface::{AdminSurface, Control, NullSurface};

use std::sync::{Mutex, MutexGuard};

// Lock acquisition ignores poisoning; display state stays readable after a
// panicked writer.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
