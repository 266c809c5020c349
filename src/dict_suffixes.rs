//! Canonical catalog of Kobo dictionary suffixes.

/// A dictionary the device can record lookups against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictSuffix {
    /// Suffix as it appears after normalisation, e.g. `en` or `de-en`
    pub locale: &'static str,
    /// Human readable dictionary name
    pub language: &'static str,
}

const fn suffix(locale: &'static str, language: &'static str) -> DictSuffix {
    DictSuffix { locale, language }
}

/// Every dictionary suffix the filter facet recognises
pub const DICT_SUFFIXES: &[DictSuffix] = &[
    suffix("de", "deutsch"),
    suffix("de-en", "deutsch - english"),
    suffix("en-de", "english - deutsch"),
    suffix("en", "english"),
    suffix("en-es", "english - español"),
    suffix("en-fr", "english - français"),
    suffix("en-it", "english - italiano"),
    suffix("en-ja", "english - 日本語（ジーニアス）"),
    suffix("en-nl", "english - nederlands"),
    suffix("en-pt", "english - português"),
    suffix("en-tr", "english - türkçe"),
    suffix("es-en", "español - english"),
    suffix("es", "español"),
    suffix("fr-en", "français - english"),
    suffix("fr", "français"),
    suffix("fr-nl", "français - nederlands"),
    suffix("it-en", "italiano - english"),
    suffix("it", "italiano"),
    suffix("jaxxdjs", "日本語"),
    suffix("nl", "nederlands"),
    suffix("nl-en", "nederlands - english"),
    suffix("nl-fr", "nederlands - français"),
    suffix("pt-en", "português - english"),
    suffix("pt", "português"),
    suffix("sv", "svenska"),
];

/// Strip the single leading `-` the device stores on some suffixes
#[must_use]
pub fn normalize(raw: &str) -> &str {
    raw.strip_prefix('-').unwrap_or(raw)
}

/// Catalog entry for an already normalised suffix
#[must_use]
pub fn dict_suffix(locale: &str) -> Option<&'static DictSuffix> {
    DICT_SUFFIXES.iter().find(|entry| entry.locale == locale)
}

/// Catalog entry for a raw stored suffix
#[must_use]
pub fn lookup_raw(raw: &str) -> Option<&'static DictSuffix> {
    dict_suffix(normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_one_dash() {
        assert_eq!(normalize("-en"), "en");
        assert_eq!(normalize("--en"), "-en");
        assert_eq!(normalize("de-en"), "de-en");
    }

    #[test]
    fn test_lookup_raw() {
        assert_eq!(lookup_raw("-fr").map(|s| s.language), Some("français"));
        assert!(lookup_raw("xx").is_none());
        assert!(lookup_raw("--en").is_none());
    }
}
