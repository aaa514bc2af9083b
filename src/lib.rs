//! Transition table: picks the scene transition (effect + duration) a presentation host plays when
//! switching from one scene to another.
//!
//! Rules are keyed per output canvas by `(from-scene, to-scene)` with an `"Any"` wildcard in either
//! position. The engine keeps the table in named, switchable rule sets, writes the resolved
//! transition into each scene's private settings so the host's own machinery picks it up, and
//! persists everything inside the host's scene-collection save data.
//!
//! - Build a [`TransitionTableEngine`] over a [`Host`]
//! - Feed it [`HostEvent`]s and drain its queue with [`TransitionTableEngine::run_pending`]
//! - Serve remote callers with [`handle_request`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod bridge;
pub(crate) mod engine;
pub(crate) mod host;
pub(crate) mod persist;
pub(crate) mod registry;
pub(crate) mod remote;
pub(crate) mod sync;
pub(crate) mod table;

pub use crate::foundation::core::{DialogSize, DurationMs, WILDCARD, is_wildcard};
pub use crate::foundation::error::{TableError, TableResult};

pub use crate::bridge::events::HostEvent;
pub use crate::engine::TransitionTableEngine;
pub use crate::engine::io::{IoGuard, LoadReport};
pub use crate::engine::opts::EngineOpts;
pub use crate::host::memory::MemoryHost;
pub use crate::host::{
    DURATION_KEY, Host, HotkeyId, SourceRef, Subscription, TRANSITION_KEY, TransitionStartFn,
};
pub use crate::persist::file::ExportScope;
pub use crate::persist::load::LoadSource;
pub use crate::persist::schema::{MATRIX_KEY, RuleFile, TABLE_KEY};
pub use crate::registry::rule_set::{RuleSet, RuleSetRegistry};
pub use crate::remote::commands::{
    REQUESTS, VENDOR_NAME, get_table, get_transition, handle_request,
    proc_get_transition_table_transition, set_transition,
};
pub use crate::sync::overrides::{SceneOverride, plan_overrides};
pub use crate::sync::queue::{SyncTask, TaskQueue, TaskSender, coalesce};
pub use crate::table::lookup::TransitionTable;
pub use crate::table::rule::{RuleRecord, TransitionRule};
pub use crate::table::view::{RowFilter, RuleRow, RuleStatus, TransitionMatrix};
