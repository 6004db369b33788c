use std::env;

use arffsplit_types::Locale;

/// Environment variable selecting the UI language.
pub const LANG_ENV: &str = "ARFFSPLIT_LANG";

/// Pick the UI language: `explicit`, then `ARFFSPLIT_LANG`, then the POSIX
/// `LC_ALL` / `LANG` variables.
pub fn detect_locale(explicit: Option<&str>) -> Locale {
    let from_env = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
    explicit
        .map(str::to_owned)
        .or_else(|| from_env(LANG_ENV))
        .or_else(|| from_env("LC_ALL"))
        .or_else(|| from_env("LANG"))
        .map(|tag| Locale::from_tag(&tag))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_choice_wins() {
        temp_env::with_var(LANG_ENV, Some("en"), || {
            assert_eq!(detect_locale(Some("es")), Locale::Es);
        });
    }

    #[test]
    fn app_variable_beats_posix_lang() {
        temp_env::with_vars([(LANG_ENV, Some("es")), ("LC_ALL", None), ("LANG", Some("en_US.UTF-8"))], || {
            assert_eq!(detect_locale(None), Locale::Es);
        });
    }

    #[test]
    fn posix_lang_is_used_last() {
        temp_env::with_vars([(LANG_ENV, None), ("LC_ALL", None), ("LANG", Some("es_ES.UTF-8"))], || {
            assert_eq!(detect_locale(None), Locale::Es);
        });
        temp_env::with_vars([(LANG_ENV, None::<&str>), ("LC_ALL", None), ("LANG", None)], || {
            assert_eq!(detect_locale(None), Locale::En);
        });
    }
}
