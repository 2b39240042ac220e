use std::fmt;

use crate::types::text::normalize;

/// Prefixes (after normalisation) marking a desire tag such as
/// `"Envie de manger indien"` or `"Envie d'un verre"`.
const DESIRE_PREFIXES: [&str; 2] = ["envie de ", "envie d "];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagCategory {
    Food,
    Drink,
    Activity,
    Ambiance,
    Service,
    Payment,
    Other(String),
}

impl TagCategory {
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return None;
        }
        let category = match normalized.as_str() {
            "food" | "cuisine" | "plat" | "plats" | "nourriture" | "specialite" => Self::Food,
            "drink" | "drinks" | "boisson" | "boissons" => Self::Drink,
            "activity" | "activite" | "activites" | "loisir" | "loisirs" => Self::Activity,
            "ambiance" | "atmosphere" | "cadre" => Self::Ambiance,
            "service" | "services" | "equipement" | "equipements" | "accessibilite" => Self::Service,
            "payment" | "payments" | "paiement" | "paiements" | "moyen de paiement"
            | "moyens de paiement" => Self::Payment,
            _ => Self::Other(normalized),
        };
        Some(category)
    }

    /// Categories describing logistics rather than what the place offers.
    pub fn is_thematic(&self) -> bool {
        !matches!(self, Self::Payment | Self::Service)
    }
}

/// A descriptive tag parsed once at ingestion.
///
/// Raw tags are free-form strings that may carry an emoji prefix and a
/// `|category` suffix (`"🍕 Pizza|food"`). The ranking pipeline only ever sees
/// the structured form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    label: String,
    normalized: String,
    category: Option<TagCategory>,
    desire: Option<String>,
}

impl Tag {
    /// Returns `None` when nothing meaningful is left once the decorations are
    /// stripped.
    pub fn parse(raw: &str) -> Option<Self> {
        let (label_part, category) = match raw.rsplit_once('|') {
            Some((label, suffix)) => (label, TagCategory::parse(suffix)),
            None => (raw, None),
        };
        let label = label_part
            .trim_start_matches(|ch: char| !ch.is_alphanumeric())
            .trim_end();
        let normalized = normalize(label);
        if normalized.is_empty() {
            return None;
        }
        let desire = DESIRE_PREFIXES
            .iter()
            .find_map(|prefix| normalized.strip_prefix(prefix))
            .map(str::trim)
            .filter(|rest| !rest.is_empty())
            .map(str::to_string);
        Some(Self {
            label: label.to_string(),
            normalized,
            category,
            desire,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn category(&self) -> Option<&TagCategory> {
        self.category.as_ref()
    }

    /// The phrase following `"Envie de"`, normalised.
    pub fn desire(&self) -> Option<&str> {
        self.desire.as_deref()
    }

    pub fn is_thematic(&self) -> bool {
        self.category.as_ref().is_none_or(TagCategory::is_thematic)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
