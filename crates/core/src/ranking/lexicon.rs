//! Built-in French vocabulary for desire parsing. Every entry is already
//! normalised (lowercase, no accents) and stemmed.

/// Words carrying no thematic meaning on their own.
pub const STOPWORDS: &[&str] = &[
    "a", "ai", "au", "aux", "avec", "ce", "ces", "cet", "cette", "chez", "d", "dans", "de",
    "des", "du", "en", "envie", "est", "et", "faire", "il", "j", "je", "l", "la", "le", "les",
    "leur", "ma", "me", "mes", "moi", "mon", "nous", "on", "ou", "par", "pas", "peu", "pour",
    "qu", "que", "qui", "sa", "se", "ses", "son", "sur", "ta", "te", "tes", "ton", "tu", "un",
    "une", "veux", "voudrais", "vous", "y", "aller", "sortir", "bien", "bon", "bonne", "petit",
    "petite", "soir", "quelque", "chose", "endroit", "lieu",
];

/// Words splitting a desire into independent intents.
pub const CONNECTORS: &[&str] = &["et", "ou", "puis", "plus", "ensuite", "avant", "apres"];

/// Verbs that say how, not what. They only count in a desire tag when
/// nothing more specific is left.
pub const GENERIC_VERBS: &[&str] = &[
    "manger", "boire", "prendre", "voir", "jouer", "decouvrir", "passer", "partager", "gouter",
    "deguster", "profiter",
];

/// Maps a query term to the activity labels it implies.
const INTENT_LEXICON: &[(&str, &[&str])] = &[
    ("kart", &["karting"]),
    ("karting", &["karting"]),
    ("bowling", &["bowling"]),
    ("laser", &["laser game"]),
    ("lasergame", &["laser game"]),
    ("escape", &["escape game"]),
    ("billard", &["billard"]),
    ("flechette", &["bar"]),
    ("boire", &["bar"]),
    ("verre", &["bar"]),
    ("biere", &["bar", "brasserie"]),
    ("cocktail", &["bar"]),
    ("vin", &["bar", "bar a vin"]),
    ("apero", &["bar"]),
    ("aperitif", &["bar"]),
    ("pinte", &["bar"]),
    ("danser", &["discotheque"]),
    ("danse", &["discotheque"]),
    ("boite", &["discotheque"]),
    ("club", &["discotheque"]),
    ("manger", &["restaurant"]),
    ("diner", &["restaurant"]),
    ("dejeuner", &["restaurant"]),
    ("repas", &["restaurant"]),
    ("resto", &["restaurant"]),
    ("restaurant", &["restaurant"]),
    ("pizza", &["restaurant", "pizzeria"]),
    ("pizzeria", &["restaurant", "pizzeria"]),
    ("burger", &["restaurant", "fast food"]),
    ("kebab", &["restaurant", "fast food"]),
    ("sushi", &["restaurant"]),
    ("indien", &["restaurant"]),
    ("tandoori", &["restaurant"]),
    ("curry", &["restaurant"]),
    ("crepe", &["restaurant", "creperie"]),
    ("brunch", &["restaurant", "cafe"]),
    ("cafe", &["cafe"]),
    ("the", &["cafe", "salon de the"]),
    ("glace", &["glacier"]),
    ("cinema", &["cinema"]),
    ("film", &["cinema"]),
    ("concert", &["salle de concert"]),
    ("musee", &["musee"]),
    ("expo", &["musee"]),
    ("exposition", &["musee"]),
    ("piscine", &["piscine"]),
    ("nager", &["piscine"]),
    ("escalade", &["escalade"]),
    ("grimper", &["escalade"]),
    ("spa", &["spa"]),
    ("massage", &["spa"]),
    ("karaoke", &["karaoke"]),
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn is_connector(word: &str) -> bool {
    CONNECTORS.contains(&word)
}

pub fn is_generic_verb(word: &str) -> bool {
    GENERIC_VERBS.contains(&word)
}

pub fn activities_for(term: &str) -> &'static [&'static str] {
    INTENT_LEXICON
        .iter()
        .find(|(key, _)| *key == term)
        .map(|(_, activities)| *activities)
        .unwrap_or(&[])
}
