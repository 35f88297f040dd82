//! Settings state containers
//!
//! Every store is constructed explicitly with the backend and client storage
//! it uses; none of them is global.

pub mod agents;
pub mod chat_commands;
pub mod config_store;
pub mod error_strategy;
pub mod fallback_chain;
pub mod gestures;
pub mod key_bar;
pub mod preferences;
pub mod templates;

pub use agents::{AgentStatusStore, LoadTicket, ModelListLoader};
pub use chat_commands::{ChatCommandDraft, ChatCommandStore};
pub use config_store::ConfigStore;
pub use error_strategy::{ErrorStrategyEditor, ErrorStrategyKind};
pub use fallback_chain::FallbackChain;
pub use gestures::{GestureSettings, GestureStore, PartialGestureSettings};
pub use key_bar::{key_catalog, KeyBarPreset, KeyBarStore, KeyDefinition};
pub use preferences::{
    LocalPreferences, PartialLocalPreferences, PartialNotificationPreferences,
    PartialSoundPreferences, PreferenceStore, SoundMode, Theme,
};
pub use templates::{PreviewOutcome, TemplateEditor};
