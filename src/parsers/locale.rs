//! Locale and separator inference from accessibility-label vocabulary.
//!
//! The trailing words of a page's labels ("views", "channel", ...) betray
//! the UI language. The guess is a heuristic with no failure mode, only
//! imprecision: an incorrect locale degrades dissection quality downstream
//! rather than failing hard.

/// Per-locale vocabulary, used both for guessing the UI language and for
/// mining relative time and view counts out of composite labels.
pub struct LocaleSpec {
    pub locale: &'static str,
    /// Word joining title and author in composite labels ("by"); empty
    /// when the language concatenates without one.
    pub separator: &'static str,
    /// Words terminating a views clause.
    pub views_words: &'static [&'static str],
    /// Extra trailing words that identify the locale ("channel", ...).
    pub hint_words: &'static [&'static str],
    /// Marker of the relative-time clause ("ago", "fa", "il y a").
    pub ago_words: &'static [&'static str],
    /// Time-unit word stems and their length in seconds. Stems are
    /// lowercase and matched by prefix, so plurals resolve too.
    pub time_units: &'static [(&'static str, u64)],
}

const MINUTE: u64 = 60;
const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;
const WEEK: u64 = 604_800;
const MONTH: u64 = 2_592_000;
const YEAR: u64 = 31_536_000;

pub const LOCALES: &[LocaleSpec] = &[
    LocaleSpec {
        locale: "en",
        separator: "by",
        views_words: &["views", "view"],
        hint_words: &["channel"],
        ago_words: &["ago"],
        time_units: &[
            ("second", 1),
            ("minute", MINUTE),
            ("hour", HOUR),
            ("day", DAY),
            ("week", WEEK),
            ("month", MONTH),
            ("year", YEAR),
        ],
    },
    LocaleSpec {
        locale: "it",
        separator: "di",
        views_words: &["visualizzazioni", "visualizzazione"],
        hint_words: &["canale"],
        ago_words: &["fa"],
        time_units: &[
            ("second", 1),
            ("minut", MINUTE),
            ("or", HOUR),
            ("giorn", DAY),
            ("settiman", WEEK),
            ("mes", MONTH),
            ("ann", YEAR),
        ],
    },
    LocaleSpec {
        locale: "es",
        separator: "de",
        views_words: &["visualizaciones", "vistas"],
        hint_words: &["canal"],
        ago_words: &["hace"],
        time_units: &[
            ("segund", 1),
            ("minut", MINUTE),
            ("hora", HOUR),
            ("día", DAY),
            ("dia", DAY),
            ("seman", WEEK),
            ("mes", MONTH),
            ("año", YEAR),
        ],
    },
    LocaleSpec {
        locale: "fr",
        separator: "de",
        views_words: &["vues", "vue"],
        hint_words: &["chaîne"],
        ago_words: &["il y a"],
        time_units: &[
            ("second", 1),
            ("minut", MINUTE),
            ("heure", HOUR),
            ("jour", DAY),
            ("semain", WEEK),
            ("mois", MONTH),
            ("an", YEAR),
        ],
    },
    LocaleSpec {
        locale: "de",
        separator: "von",
        views_words: &["aufrufe", "aufruf"],
        hint_words: &["kanal"],
        ago_words: &["vor"],
        time_units: &[
            ("sekunde", 1),
            ("minute", MINUTE),
            ("stunde", HOUR),
            ("tag", DAY),
            ("woche", WEEK),
            ("monat", MONTH),
            ("jahr", YEAR),
        ],
    },
    LocaleSpec {
        locale: "pt",
        separator: "de",
        views_words: &["visualizações", "visualizacoes"],
        hint_words: &["canal"],
        ago_words: &["há"],
        time_units: &[
            ("segund", 1),
            ("minut", MINUTE),
            ("hora", HOUR),
            ("dia", DAY),
            ("seman", WEEK),
            ("mês", MONTH),
            ("mes", MONTH),
            ("ano", YEAR),
        ],
    },
    LocaleSpec {
        locale: "nl",
        separator: "door",
        views_words: &["weergaven"],
        hint_words: &["kanaal"],
        ago_words: &["geleden"],
        time_units: &[
            ("second", 1),
            ("minu", MINUTE),
            ("uur", HOUR),
            ("dag", DAY),
            ("week", WEEK),
            ("weken", WEEK),
            ("maand", MONTH),
            ("jaar", YEAR),
        ],
    },
    // Japanese labels concatenate title and author with no separator word
    LocaleSpec {
        locale: "ja",
        separator: "",
        views_words: &["回視聴", "回再生"],
        hint_words: &["チャンネル"],
        ago_words: &["前"],
        time_units: &[
            ("秒", 1),
            ("分", MINUTE),
            ("時間", HOUR),
            ("日", DAY),
            ("週間", WEEK),
            ("か月", MONTH),
            ("ヶ月", MONTH),
            ("年", YEAR),
        ],
    },
];

/// Outcome of the inference, driving downstream regex construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleInfo {
    pub locale: String,
    /// May be empty; dissection falls back to a title-offset split.
    pub separator: String,
}

/// Look up the vocabulary table for a guessed locale.
pub fn spec_for(locale: &str) -> Option<&'static LocaleSpec> {
    LOCALES.iter().find(|s| s.locale == locale)
}

/// Guess the UI locale from the distinct trailing words of a record's
/// labels. Ties and zero matches both fall back to English.
pub fn guess_language(last_words: &[&str]) -> LocaleInfo {
    let mut best: Option<(&LocaleSpec, usize)> = None;

    for spec in LOCALES {
        let score = last_words
            .iter()
            .filter(|w| {
                let w = w.to_lowercase();
                spec.views_words.iter().any(|v| w.contains(v))
                    || spec.hint_words.iter().any(|h| w.contains(h))
            })
            .count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((spec, score));
        }
    }

    let spec = best.map(|(s, _)| s).unwrap_or(&LOCALES[0]);
    LocaleInfo {
        locale: spec.locale.to_string(),
        separator: spec.separator.to_string(),
    }
}
