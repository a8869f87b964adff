use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

const COMMON: &[(&str, &str)] = &[
    ("information", "info"),
    ("maximum", "max"),
    ("minimum", "min"),
    ("and", "&"),
    ("number", "no."),
    ("application", "app"),
    ("configuration", "config"),
    ("administrator", "admin"),
    ("description", "desc."),
    ("approximately", "approx."),
    ("international", "intl."),
    ("management", "mgmt."),
];

const LANGUAGES: &[(&str, &[(&str, &str)])] = &[
    (
        "es",
        &[
            ("información", "info"),
            ("máximo", "máx."),
            ("mínimo", "mín."),
            ("aplicación", "app"),
            ("configuración", "config."),
            ("administrador", "admin."),
            ("descripción", "desc."),
            ("número", "nº"),
            ("aproximadamente", "aprox."),
        ],
    ),
    (
        "pt",
        &[
            ("informações", "infos"),
            ("informação", "info"),
            ("máximo", "máx."),
            ("mínimo", "mín."),
            ("aplicação", "app"),
            ("configuração", "config."),
            ("administrador", "admin."),
            ("descrição", "desc."),
            ("número", "nº"),
        ],
    ),
    (
        "fr",
        &[
            ("informations", "infos"),
            ("information", "info"),
            ("maximum", "max."),
            ("minimum", "min."),
            ("application", "appli"),
            ("configuration", "config."),
            ("administrateur", "admin."),
            ("numéro", "nº"),
            ("et", "&"),
        ],
    ),
    (
        "de",
        &[
            ("Informationen", "Infos"),
            ("Information", "Info"),
            ("maximal", "max."),
            ("minimal", "min."),
            ("Anwendung", "App"),
            ("Konfiguration", "Konfig."),
            ("Administrator", "Admin"),
            ("Beschreibung", "Beschr."),
            ("Nummer", "Nr."),
            ("und", "&"),
        ],
    ),
    (
        "it",
        &[
            ("informazioni", "info"),
            ("massimo", "max"),
            ("minimo", "min"),
            ("applicazione", "app"),
            ("configurazione", "config."),
            ("amministratore", "admin"),
            ("descrizione", "descr."),
            ("numero", "n."),
        ],
    ),
    (
        "pl",
        &[
            ("informacje", "info"),
            ("maksymalnie", "maks."),
            ("minimalnie", "min."),
            ("aplikacja", "apl."),
            ("konfiguracja", "konfig."),
            ("administrator", "admin"),
            ("numer", "nr"),
        ],
    ),
    (
        "nl",
        &[
            ("informatie", "info"),
            ("maximaal", "max."),
            ("minimaal", "min."),
            ("applicatie", "app"),
            ("configuratie", "config."),
            ("beheerder", "beheer"),
            ("nummer", "nr."),
            ("en", "&"),
        ],
    ),
    (
        "el",
        &[
            ("πληροφορίες", "πληροφ."),
            ("μέγιστο", "μέγ."),
            ("ελάχιστο", "ελάχ."),
            ("εφαρμογή", "εφαρμ."),
            ("ρυθμίσεις", "ρυθμ."),
            ("αριθμός", "αρ."),
        ],
    ),
    (
        "cs",
        &[
            ("informace", "info"),
            ("maximálně", "max."),
            ("minimálně", "min."),
            ("aplikace", "apl."),
            ("konfigurace", "konfig."),
            ("číslo", "č."),
        ],
    ),
    (
        "tr",
        &[
            ("maksimum", "maks."),
            ("minimum", "min."),
            ("uygulama", "uyg."),
            ("yapılandırma", "yapıl."),
            ("yönetici", "yön."),
            ("numara", "no."),
        ],
    ),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbbreviationScope {
    #[default]
    PerLocale,
    Flat,
}

#[derive(Debug, Clone)]
struct Abbreviation {
    pattern: Regex,
    short: &'static str,
}

#[derive(Debug, Clone)]
struct Dictionary {
    language: &'static str,
    entries: Vec<Abbreviation>,
}

fn compile(language: &'static str, pairs: &[(&'static str, &'static str)]) -> Dictionary {
    let entries = pairs
        .iter()
        .map(|&(word, short)| Abbreviation {
            pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
                .expect("valid regex"),
            short,
        })
        .collect();
    Dictionary { language, entries }
}

static COMMON_DICTIONARY: Lazy<Dictionary> = Lazy::new(|| compile("common", COMMON));

static LANGUAGE_DICTIONARIES: Lazy<Vec<Dictionary>> = Lazy::new(|| {
    LANGUAGES
        .iter()
        .map(|&(language, pairs)| compile(language, pairs))
        .collect()
});

/// Primary language subtag, lowercased: `es-MX` and `es_MX` both give `es`.
pub fn primary_language(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    scope: AbbreviationScope,
}

impl AbbreviationTable {
    pub fn new(scope: AbbreviationScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> AbbreviationScope {
        self.scope
    }

    // Language entries before common ones.
    fn dictionaries_for(&self, locale: &str) -> Vec<&'static Dictionary> {
        let mut dicts: Vec<&'static Dictionary> = match self.scope {
            AbbreviationScope::Flat => LANGUAGE_DICTIONARIES.iter().collect(),
            AbbreviationScope::PerLocale => {
                let language = primary_language(locale);
                LANGUAGE_DICTIONARIES
                    .iter()
                    .filter(|d| d.language == language)
                    .collect()
            }
        };
        dicts.push(&*COMMON_DICTIONARY);
        dicts
    }

    pub fn apply(&self, text: &str, locale: &str) -> String {
        let mut out = text.to_string();
        for dict in self.dictionaries_for(locale) {
            for entry in &dict.entries {
                if entry.pattern.is_match(&out) {
                    out = entry
                        .pattern
                        .replace_all(&out, NoExpand(entry.short))
                        .into_owned();
                }
            }
        }
        out
    }
}
