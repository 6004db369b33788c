//! Host color-scheme signal and the theme preference that follows it.
//!
//! The host (a preference file, the terminal and its environment) is the
//! single source of the light/dark preference. The preference file is the
//! live part: [`HostWatcher`] re-reads it whenever `notify` reports an edit
//! and on a slow timer. [`ColorSchemeSignal`] publishes that preference;
//! [`ThemePreference`] subscribes once, mirrors it into a process-wide
//! [`ThemeFlag`] and notifies the view on every change. Nothing else writes
//! the flag.

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// Environment variable forcing a scheme (`dark` or `light`).
pub const COLOR_SCHEME_ENV: &str = "ARFFSPLIT_COLOR_SCHEME";
/// Environment variable pointing at the preference file.
pub const COLOR_SCHEME_FILE_ENV: &str = "ARFFSPLIT_COLOR_SCHEME_FILE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

/// Where the preference file lives: `ARFFSPLIT_COLOR_SCHEME_FILE`, else
/// `<config dir>/arffsplit/color-scheme`.
pub fn preference_file_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(COLOR_SCHEME_FILE_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs_next::config_dir().map(|dir| dir.join("arffsplit").join("color-scheme"))
}

/// Scheme named by the preference file (`dark` or `light`). Missing or
/// unreadable files report nothing.
pub fn read_preference_file(path: &Path) -> Option<ColorScheme> {
    fs::read_to_string(path).ok().and_then(|text| ColorScheme::parse(&text))
}

/// Read the host preference. `None` when the host cannot report one.
///
/// Resolution order: the preference file, `ARFFSPLIT_COLOR_SCHEME`, then the
/// `COLORFGBG` convention (`fg;bg`, exported by rxvt and Konsole).
pub fn resolve_color_scheme(preference_file: Option<&Path>) -> Option<ColorScheme> {
    preference_file.and_then(read_preference_file).or_else(detect_color_scheme)
}

/// Environment part of [`resolve_color_scheme`]. Fixed for the life of the
/// process.
pub fn detect_color_scheme() -> Option<ColorScheme> {
    if let Some(scheme) = env::var(COLOR_SCHEME_ENV).ok().and_then(|v| ColorScheme::parse(&v)) {
        return Some(scheme);
    }
    env::var("COLORFGBG").ok().and_then(|v| scheme_from_colorfgbg(&v))
}

fn scheme_from_colorfgbg(value: &str) -> Option<ColorScheme> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(ColorScheme::Dark),
        7 | 9..=15 => Some(ColorScheme::Light),
        _ => None,
    }
}

/// Publisher side of the host preference.
#[derive(Debug, Clone)]
pub struct ColorSchemeSignal {
    sender: Arc<watch::Sender<Option<ColorScheme>>>,
}

impl ColorSchemeSignal {
    pub fn new(initial: Option<ColorScheme>) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender: Arc::new(sender) }
    }

    /// Seed the signal from the host as it is right now.
    pub fn from_host(preference_file: Option<&Path>) -> Self {
        Self::new(resolve_color_scheme(preference_file))
    }

    pub fn current(&self) -> Option<ColorScheme> {
        *self.sender.borrow()
    }

    /// Publish a new preference. Subscribers are only woken on an actual change.
    pub fn publish(&self, scheme: Option<ColorScheme>) {
        self.sender.send_if_modified(|current| {
            if *current == scheme {
                return false;
            }
            *current = scheme;
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ColorScheme>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Follow the host: re-resolve the preference whenever the preference
    /// file changes on disk, and at least every `every`. Without a file (or
    /// when its directory cannot be watched) only the timer runs.
    pub fn spawn_host_watcher(&self, preference_file: Option<PathBuf>, every: Duration) -> HostWatcher {
        let (wake, mut wakeups) = mpsc::unbounded_channel();
        let fs_watcher = preference_file.as_deref().and_then(|path| match watch_preference_file(path, wake) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "not watching color scheme file");
                None
            }
        });

        let signal = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    Some(()) = wakeups.recv() => {}
                    _ = ticker.tick() => {}
                }
                signal.publish(resolve_color_scheme(preference_file.as_deref()));
            }
        });

        HostWatcher { fs_watcher, task }
    }
}

/// Watch the directory holding `path` so that editors replacing the file
/// by rename are seen too. Events for other files are ignored.
fn watch_preference_file(path: &Path, wake: mpsc::UnboundedSender<()>) -> notify::Result<RecommendedWatcher> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path.file_name().map(|name| name.to_os_string());

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        let Ok(event) = event else { return };
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        if event.paths.iter().any(|p| p.file_name() == file_name.as_deref()) {
            let _ = wake.send(());
        }
    })?;
    watcher.watch(&directory, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Background task keeping a [`ColorSchemeSignal`] in line with the host.
/// Stops on [`HostWatcher::stop`] or drop.
#[derive(Debug)]
pub struct HostWatcher {
    fs_watcher: Option<RecommendedWatcher>,
    task: JoinHandle<()>,
}

impl HostWatcher {
    pub fn is_watching_file(&self) -> bool {
        self.fs_watcher.is_some()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for HostWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read-only view of the process-wide dark-mode flag.
#[derive(Debug, Clone)]
pub struct ThemeFlag(Arc<AtomicBool>);

impl ThemeFlag {
    pub fn is_dark(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Live subscription to a [`ColorSchemeSignal`].
///
/// Must be created inside a tokio runtime. Dropping the preference releases
/// the subscription.
#[derive(Debug)]
pub struct ThemePreference {
    flag: ThemeFlag,
    listener: Option<JoinHandle<()>>,
}

impl ThemePreference {
    /// Read the initial value synchronously (light when unknown), then follow
    /// the signal. `on_change` runs with the new flag after every change.
    pub fn subscribe<F>(signal: &ColorSchemeSignal, on_change: F) -> Self
    where
        F: Fn(bool) + Send + 'static,
    {
        let mut receiver = signal.subscribe();
        let initial = receiver.borrow_and_update().unwrap_or_default().is_dark();
        let shared = Arc::new(AtomicBool::new(initial));
        let writer = Arc::clone(&shared);

        let listener = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let dark = receiver.borrow_and_update().unwrap_or_default().is_dark();
                if writer.swap(dark, Ordering::Relaxed) != dark {
                    debug!(dark, "host color scheme changed");
                    on_change(dark);
                }
            }
        });

        Self {
            flag: ThemeFlag(shared),
            listener: Some(listener),
        }
    }

    pub fn flag(&self) -> ThemeFlag {
        self.flag.clone()
    }

    pub fn is_dark(&self) -> bool {
        self.flag.is_dark()
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.is_some()
    }

    /// Stop following the signal. The flag keeps its last value.
    pub fn unsubscribe(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

impl Drop for ThemePreference {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn colorfgbg_background_decides() {
        assert_eq!(scheme_from_colorfgbg("15;0"), Some(ColorScheme::Dark));
        assert_eq!(scheme_from_colorfgbg("0;default;15"), Some(ColorScheme::Light));
        assert_eq!(scheme_from_colorfgbg("0;7"), Some(ColorScheme::Light));
        assert_eq!(scheme_from_colorfgbg("garbage"), None);
    }

    #[test]
    fn explicit_override_beats_colorfgbg() {
        temp_env::with_vars([(COLOR_SCHEME_ENV, Some("dark")), ("COLORFGBG", Some("0;15"))], || {
            assert_eq!(detect_color_scheme(), Some(ColorScheme::Dark));
        });
        temp_env::with_vars([(COLOR_SCHEME_ENV, None), ("COLORFGBG", Some("0;15"))], || {
            assert_eq!(detect_color_scheme(), Some(ColorScheme::Light));
        });
        temp_env::with_vars([(COLOR_SCHEME_ENV, None::<&str>), ("COLORFGBG", None)], || {
            assert_eq!(detect_color_scheme(), None);
        });
    }

    #[test]
    fn preference_file_beats_environment() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("color-scheme");
        std::fs::write(&file, "Dark\n").unwrap();

        temp_env::with_vars([(COLOR_SCHEME_ENV, Some("light"))], || {
            assert_eq!(resolve_color_scheme(Some(&file)), Some(ColorScheme::Dark));
            assert_eq!(resolve_color_scheme(Some(&dir.path().join("missing"))), Some(ColorScheme::Light));
            assert_eq!(resolve_color_scheme(None), Some(ColorScheme::Light));
        });
    }

    #[test]
    fn preference_file_location_can_be_overridden() {
        temp_env::with_var(COLOR_SCHEME_FILE_ENV, Some("/srv/theme"), || {
            assert_eq!(preference_file_path(), Some(PathBuf::from("/srv/theme")));
        });
    }

    #[tokio::test]
    async fn host_watcher_turns_file_edits_into_theme_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("color-scheme");
        std::fs::write(&file, "light").unwrap();

        let signal = ColorSchemeSignal::from_host(Some(&file));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let preference = ThemePreference::subscribe(&signal, move |dark| {
            let _ = tx.send(dark);
        });
        assert!(!preference.is_dark());

        let watcher = signal.spawn_host_watcher(Some(file.clone()), Duration::from_millis(200));
        assert!(watcher.is_watching_file());

        std::fs::write(&file, "dark").unwrap();
        let changed = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(changed, Some(true));
        assert!(preference.is_dark());
        assert_eq!(signal.current(), Some(ColorScheme::Dark));

        std::fs::write(&file, "light").unwrap();
        let changed = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(changed, Some(false));

        watcher.stop();
    }

    #[tokio::test]
    async fn host_watcher_without_file_still_polls() {
        let signal = ColorSchemeSignal::new(Some(ColorScheme::Dark));
        let watcher = signal.spawn_host_watcher(None, Duration::from_millis(20));
        assert!(!watcher.is_watching_file());
        let mut receiver = signal.subscribe();
        // The first tick re-resolves from the environment alone.
        let expected = detect_color_scheme();
        tokio::time::timeout(Duration::from_secs(5), receiver.wait_for(|scheme| *scheme == expected))
            .await
            .unwrap()
            .unwrap();
        drop(watcher);
    }

    #[tokio::test]
    async fn unknown_host_defaults_to_light() {
        let signal = ColorSchemeSignal::new(None);
        let preference = ThemePreference::subscribe(&signal, |_| {});
        assert!(!preference.is_dark());
    }

    #[tokio::test]
    async fn initial_value_is_read_synchronously() {
        let signal = ColorSchemeSignal::new(Some(ColorScheme::Dark));
        let preference = ThemePreference::subscribe(&signal, |_| {});
        assert!(preference.is_dark());
    }

    #[tokio::test]
    async fn follows_host_changes_and_notifies() {
        let signal = ColorSchemeSignal::new(Some(ColorScheme::Light));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let preference = ThemePreference::subscribe(&signal, move |dark| {
            let _ = tx.send(dark);
        });
        let flag = preference.flag();

        signal.publish(Some(ColorScheme::Dark));
        assert_eq!(rx.recv().await, Some(true));
        assert!(flag.is_dark());

        signal.publish(None);
        assert_eq!(rx.recv().await, Some(false));
        assert!(!flag.is_dark());
    }

    #[tokio::test]
    async fn unsubscribe_stops_following() {
        let signal = ColorSchemeSignal::new(None);
        let mut preference = ThemePreference::subscribe(&signal, |_| {});
        assert_eq!(signal.subscriber_count(), 1);

        preference.unsubscribe();
        assert!(!preference.is_subscribed());
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        signal.publish(Some(ColorScheme::Dark));
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert!(!preference.is_dark());
        assert_eq!(signal.subscriber_count(), 0);
    }
}
