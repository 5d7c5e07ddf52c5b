//! Deferred, coalesced component state fields for UI hosts.
//!
//! anystate augments a host framework's components with declared state
//! fields whose writes are buffered per instance and applied in a single
//! batched commit one macro-tick later. Reads are never stale relative to
//! the instance's own writes; teardown makes every later commit inert.
//!
//! # Architecture
//!
//! ```text
//! FieldAccessor::set ──→ deferred buffer ──→ CommitSpawner (one tick)
//!        │                     │                    │
//! FieldAccessor::get ←─────────┘             StateHost::merge_state
//! ```
//!
//! - [`field`]: per-field declarations and the generated get/set pair
//! - [`runtime`]: the per-instance buffer, commit lifecycle, unmount guard
//! - [`sched`]: the cancellable async commit primitive (Tokio or manual)
//! - [`host`]: the seam to the enclosing framework's live state
//! - [`config`]: diagnostic flags, loaded the usual TOML way
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use anystate::{register_field, DeferredState, FieldConfig, LogConfig, ManualSpawner, MapHost};
//! use serde_json::json;
//!
//! let host = Rc::new(RefCell::new(MapHost::with_empty_state()));
//! let spawner = ManualSpawner::new();
//! let state = DeferredState::new(host.clone(), Rc::new(spawner.clone()), LogConfig::default());
//!
//! let count = register_field("count", FieldConfig::new().with_initial(json!(0)));
//! count.set(&state, 1);
//! count.set(&state, 2);
//! assert_eq!(count.value(&state), json!(2)); // read-your-writes
//!
//! spawner.run_pending(); // the macro-tick elapses
//! assert_eq!(host.borrow().field("count"), Some(&json!(2)));
//! ```

pub mod config;
pub mod field;
pub mod host;
pub mod runtime;
pub mod sched;

pub use config::{Config, ConfigError, ConfigStore, LogConfig};
pub use field::{register_field, FieldAccessor, FieldConfig, ReadOutcome, TransformContext, WriteOutcome};
pub use host::{MapHost, StateHost, StateMap};
pub use runtime::{ChangeMarker, DeferredState, TeardownHooks};
pub use sched::{CommitFn, CommitHandle, CommitSpawner, ManualSpawner, TokioLocalSpawner};
