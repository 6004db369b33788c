use std::path::{Path, PathBuf};

use dirs_next::home_dir;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Render `path` for the status line, abbreviating the home directory to `~`.
pub fn display_path(path: &Path) -> String {
    abbreviate_home(path, home_dir().as_deref())
}

fn abbreviate_home(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde(" /tmp/out "), PathBuf::from("/tmp/out"));
        assert_eq!(expand_tilde("relative/dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn tilde_expands_when_home_is_known() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/Downloads"), home.join("Downloads"));
            assert_eq!(expand_tilde("~"), home);
        }
    }

    #[test]
    fn home_prefix_is_abbreviated() {
        let home = Path::new("/home/ada");
        assert_eq!(abbreviate_home(Path::new("/home/ada"), Some(home)), "~");
        assert_eq!(
            abbreviate_home(Path::new("/home/ada/Downloads/splits.zip"), Some(home)),
            format!("~{}Downloads/splits.zip", std::path::MAIN_SEPARATOR)
        );
        assert_eq!(abbreviate_home(Path::new("/srv/out.zip"), Some(home)), "/srv/out.zip");
        assert_eq!(abbreviate_home(Path::new("/srv/out.zip"), None), "/srv/out.zip");
    }
}
