//! User-facing strings in the supported languages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Map a language tag such as `es`, `es_AR.UTF-8` or `en-US` to a locale.
    /// Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let lang = tag.trim().split(['_', '-', '.']).next().unwrap_or_default();
        if lang.eq_ignore_ascii_case("es") { Self::Es } else { Self::En }
    }

    pub fn invalid_extension(&self) -> &'static str {
        match self {
            Self::En => "Only ARFF files are permitted (.arff extension)",
            Self::Es => "Solo se permiten archivos con extensión .arff",
        }
    }

    pub fn upload_fallback(&self) -> &'static str {
        match self {
            Self::En => "Error while uploading file",
            Self::Es => "Error al subir archivo",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::En => "Upload your ARFF file",
            Self::Es => "Carga tu archivo ARFF",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::En => "The dataset is split into stratified train, validation and test sets and returned as a zip archive.",
            Self::Es => "El conjunto de datos se divide en entrenamiento, validación y prueba estratificados y se devuelve como un archivo zip.",
        }
    }

    pub fn idle_prompt(&self) -> &'static str {
        match self {
            Self::En => "Type a path and press Enter to upload",
            Self::Es => "Escribe una ruta y pulsa Enter para subir",
        }
    }

    pub fn picker_hint(&self) -> &'static str {
        match self {
            Self::En => "ARFF files only",
            Self::Es => "Solo archivos ARFF",
        }
    }

    pub fn processing(&self) -> &'static str {
        match self {
            Self::En => "Processing file...",
            Self::Es => "Procesando archivo...",
        }
    }

    pub fn error_heading(&self) -> &'static str {
        match self {
            Self::En => "Error while processing the file",
            Self::Es => "Error al procesar el archivo",
        }
    }

    pub fn success(&self) -> &'static str {
        match self {
            Self::En => "File processed! The download has started.",
            Self::Es => "¡Archivo procesado! La descarga ha comenzado.",
        }
    }

    pub fn download_again(&self) -> &'static str {
        match self {
            Self::En => "Download again",
            Self::Es => "Descargar de nuevo",
        }
    }

    pub fn stratify_label(&self) -> &'static str {
        match self {
            Self::En => "Stratify by",
            Self::Es => "Estratificar por",
        }
    }

    pub fn saved_to(&self) -> &'static str {
        match self {
            Self::En => "Saved to",
            Self::Es => "Guardado en",
        }
    }

    pub fn save_failed(&self) -> &'static str {
        match self {
            Self::En => "Could not save the archive",
            Self::Es => "No se pudo guardar el archivo",
        }
    }

    pub fn file_label(&self) -> &'static str {
        match self {
            Self::En => "ARFF file",
            Self::Es => "Archivo ARFF",
        }
    }

    pub fn key_hints(&self) -> &'static str {
        match self {
            Self::En => "Enter upload  ←/→ stratify  Ctrl+D download again  Esc clear  Ctrl+C quit",
            Self::Es => "Enter subir  ←/→ estratificar  Ctrl+D descargar de nuevo  Esc limpiar  Ctrl+C salir",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_posix_and_bcp47_tags() {
        assert_eq!(Locale::from_tag("es_AR.UTF-8"), Locale::Es);
        assert_eq!(Locale::from_tag("ES"), Locale::Es);
        assert_eq!(Locale::from_tag("en-US"), Locale::En);
        assert_eq!(Locale::from_tag("C"), Locale::En);
        assert_eq!(Locale::from_tag(""), Locale::En);
    }
}
