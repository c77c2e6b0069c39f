//! weaver-snippets-core: shortcut matching and in-place snippet replacement.
//!
//! This crate is free of browser dependencies. It provides:
//! - `SnippetDictionary` / `DictionaryMirror` - the in-memory snippet snapshot
//! - `classify` - decides which editable surfaces are supported
//! - `find_match` - locates the shortcut occurrence to replace
//! - `replace_flat` / `replace_in_tree` - replacement with caret repositioning,
//!   generic over the `FlatValuePlatform` and `TextTreePlatform` traits
//! - `Trigger` - settling-delay scheduling of evaluations
//! - `SurfaceRegistry` - idempotent listener wiring bookkeeping

pub mod classify;
pub mod config;
pub mod debug;
pub mod dictionary;
pub mod error;
pub mod flat;
pub mod matcher;
pub mod platform;
pub mod registry;
pub mod surface;
pub mod text;
pub mod tree;
pub mod trigger;
pub mod types;

pub use classify::{SurfaceDescriptor, SurfaceKind, classify};
pub use config::ExpanderConfig;
pub use debug::DebugReport;
pub use dictionary::{DictionaryMirror, SnippetDictionary, StorageChange};
pub use error::ReplaceError;
pub use flat::{FlatBuffer, replace_flat};
pub use matcher::{find_match, match_candidates};
pub use platform::{ChangeNotification, FlatValuePlatform, PlatformError, TextTreePlatform};
pub use registry::{Registrable, Registration, SurfaceRegistry};
pub use smol_str::SmolStr;
pub use surface::{EditableSurface, Evaluation, FlatSurface, TreeSurface, evaluate};
pub use tree::{MemoryTree, NodeId, replace_in_tree, tree_caret, tree_text};
pub use trigger::{ManualScheduler, Scheduler, Trigger, TriggerEvent, TriggerPolicy, TriggerState};
pub use types::{Replacement, Snippet, SnippetMatch, TreeAnchor, TreePoint};
