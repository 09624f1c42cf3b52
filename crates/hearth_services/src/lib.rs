//! Engine services
//!
//! Input state, script-facing log sinks and settings.

pub mod input;
pub mod log;
pub mod settings;

pub use input::{InputSource, KeyCode, KeyboardState};
pub use log::{LogEntry, LogLevel, LogSink, MemoryLogSink, TracingLogSink};
pub use settings::{LogSettings, PhysicsSettings, ScriptSettings, Settings, SettingsError};
