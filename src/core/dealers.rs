//! Dealer-name canonicalization and per-call deduplication.

use crate::core::fields;
use crate::domain::model::SheetSet;
use crate::domain::schema::{SheetKind, DEALER};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{3,}").unwrap());

/// Canonicalizes a raw dealer name into its deduplication key.
///
/// Pipeline: trim, strip parenthetical groups (trailing dealer codes like
/// `(462011)`), lowercase, NFD-decompose, drop combining marks, collapse
/// whitespace runs, trim again.
pub fn normalize_dealer_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let no_parens = PAREN_RE.replace_all(trimmed, "");
    let lowered = no_parens.to_lowercase();
    let stripped: String = lowered
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();
    let collapsed = WS_RE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Rejects strings that are unlikely to be dealer names: emails, values with
/// long digit runs (identifiers), and very short fragments.
pub fn is_plausible_dealer_name(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    !trimmed.is_empty()
        && !trimmed.contains('@')
        && !DIGIT_RUN_RE.is_match(trimmed)
        && trimmed.chars().count() >= 3
}

/// Append-only mapping from normalized key to first-seen display name.
///
/// Later occurrences with an equal key are discarded even when they differ in
/// casing or punctuation; their rows still count toward totals elsewhere.
#[derive(Debug, Default)]
pub struct DealerBook {
    entries: HashMap<String, String>,
}

impl DealerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, raw: &str) {
        let display = raw.trim();
        if display.is_empty() {
            return;
        }
        let key = normalize_dealer_name(display);
        if key.is_empty() {
            return;
        }
        self.entries.entry(key).or_insert_with(|| display.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct display names, ordered by normalized key so that accent and
    /// case variants collate together.
    pub fn into_sorted_names(self) -> Vec<String> {
        let mut pairs: Vec<(String, String)> = self.entries.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.into_iter().map(|(_, display)| display).collect()
    }
}

/// Collects the deduplicated dealer list from the four record-bearing sheets.
pub fn extract_dealers(sheets: &SheetSet) -> Vec<String> {
    let mut book = DealerBook::new();

    let sources = [
        (SheetKind::Leads, &sheets.leads),
        (SheetKind::TestDrives, &sheets.test_drives),
        (SheetKind::CompleteJourney, &sheets.complete_journey),
        (SheetKind::Billed, &sheets.billed),
    ];

    for (kind, sheet) in sources {
        let mut rows_with_dealer = 0usize;
        for row in sheet.iter() {
            let Some(candidate) = fields::resolve_string(row, &DEALER) else {
                continue;
            };
            if kind.dealer_needs_plausibility_check() && !is_plausible_dealer_name(&candidate) {
                continue;
            }
            book.add(&candidate);
            rows_with_dealer += 1;
        }
        tracing::debug!(?kind, rows_with_dealer, "dealer extraction");
    }

    tracing::info!(unique_dealers = book.len(), "dealers deduplicated");
    book.into_sorted_names()
}
