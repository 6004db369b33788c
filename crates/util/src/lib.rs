//! Environment helpers shared by the engine, the terminal UI and the binary.

pub mod color_scheme;
pub mod locale;
pub mod path_processing;

pub use color_scheme::{
    ColorScheme, ColorSchemeSignal, HostWatcher, ThemeFlag, ThemePreference, detect_color_scheme, preference_file_path,
    resolve_color_scheme,
};
pub use locale::detect_locale;
pub use path_processing::{display_path, expand_tilde};
