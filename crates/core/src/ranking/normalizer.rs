use crate::error::CoreError;
use crate::ranking::lexicon::{activities_for, is_connector, is_stopword};
use crate::types::text::{normalize, stem};

/// Characters separating clauses before any normalisation happens.
const CLAUSE_SEPARATORS: [char; 5] = [',', ';', '+', '/', '&'];

/// One clause of a desire, e.g. `"boire un verre"` in
/// `"faire du kart et boire un verre"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub terms: Vec<String>,
    pub activities: Vec<String>,
}

impl Intent {
    fn push_term(&mut self, term: String) {
        for activity in activities_for(&term) {
            if !self.activities.iter().any(|known| known == activity) {
                self.activities.push((*activity).to_string());
            }
        }
        if !self.terms.contains(&term) {
            self.terms.push(term);
        }
    }

    fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// The whole desire, normalised but not tokenised.
    pub phrase: String,
    /// Union of every intent's terms, in order of appearance.
    pub terms: Vec<String>,
    pub intents: Vec<Intent>,
}

impl NormalizedQuery {
    /// True when only stopwords were given.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn activities(&self) -> impl Iterator<Item = &str> {
        self.intents
            .iter()
            .flat_map(|intent| intent.activities.iter().map(String::as_str))
    }
}

pub fn normalize_query(envie: &str) -> Result<NormalizedQuery, CoreError> {
    if envie.trim().is_empty() {
        return Err(CoreError::InvalidQuery("envie must not be empty".to_string()));
    }

    let mut intents = Vec::new();
    for segment in envie.split(CLAUSE_SEPARATORS) {
        let mut current = Intent::default();
        for word in normalize(segment).split(' ') {
            if word.is_empty() {
                continue;
            }
            if is_connector(word) {
                if !current.is_empty() {
                    intents.push(std::mem::take(&mut current));
                }
                continue;
            }
            if word.chars().count() < 2 || is_stopword(word) {
                continue;
            }
            let term = stem(word);
            if is_stopword(term) {
                continue;
            }
            current.push_term(term.to_string());
        }
        if !current.is_empty() {
            intents.push(current);
        }
    }

    let mut terms: Vec<String> = Vec::new();
    for term in intents.iter().flat_map(|intent| intent.terms.iter()) {
        if !terms.contains(term) {
            terms.push(term.clone());
        }
    }

    Ok(NormalizedQuery {
        phrase: normalize(envie),
        terms,
        intents,
    })
}
