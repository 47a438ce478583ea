//! Terminal console: screen navigation, wizard overlays, delete confirmation
//! and the report designer, all driven through one [`ConsoleState`].

pub mod input;
pub mod navigation;
pub mod screens;
pub mod state;

pub use navigation::{
    console_action_from_key, console_transition, parse_scripted_keys, ConsoleAction,
    ConsoleNavEffect, ConsoleNavError, ConsoleScreen, ConsoleTransition, NavState, ScriptStep,
    ALL_CONSOLE_SCREENS, SCRIPT_KEYS_ENV,
};
pub use screens::{project_console_view_model, screen_items, ConsoleViewModel};
pub use state::{ConsoleFlow, ConsoleState, DeleteTarget, PendingDelete};
