//! Text screening: whole-word blocklist matching and masking.
//!
//! A [`Blocklist`] is built once at startup and handed to whoever needs it;
//! there is no process-global list. Every term is compiled to a
//! case-insensitive pattern anchored on word boundaries, so a term never
//! matches inside a longer word ("ass" does not match "passed").
//!
//! Multi-word entries match their words separated by any run of whitespace.
//! Word boundaries are Unicode-aware: letters and digits of any script count
//! as word characters.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::Result;

/// The default list shipped with ACMS. Extend it through configuration rather
/// than editing this table.
pub const BUILTIN_TERMS: &[&str] = &[
  "damn", "hell", "shit", "fuck", "bitch", "ass", "bastard", "crap", "piss",
  "cock", "dick", "pussy", "whore", "slut", "nigger", "faggot", "retard",
  "gay", "homo", "lesbian", "queer", "tranny", "chink", "spic", "kike",
  "wetback", "gook", "towelhead", "sand nigger", "beaner",
];

// ─── Blocklist ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
  term:    String,
  pattern: Regex,
}

/// An immutable, ordered set of disallowed terms.
///
/// Terms are trimmed and lowercased; blank entries and repeats are dropped,
/// keeping the position of the first occurrence.
#[derive(Debug, Clone)]
pub struct Blocklist {
  entries: Vec<Entry>,
}

impl Blocklist {
  pub fn new<I, T>(terms: I) -> Result<Self>
  where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
  {
    let mut entries: Vec<Entry> = Vec::new();
    for raw in terms {
      let term = raw.as_ref().trim().to_lowercase();
      if term.is_empty() || entries.iter().any(|e| e.term == term) {
        continue;
      }
      let pattern = compile_term(&term)?;
      entries.push(Entry { term, pattern });
    }
    Ok(Self { entries })
  }

  /// The built-in list ([`BUILTIN_TERMS`]).
  pub fn builtin() -> Result<Self> { Self::new(BUILTIN_TERMS) }

  /// The built-in list followed by `extra`, in that order.
  pub fn with_extra_terms<I, T>(extra: I) -> Result<Self>
  where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
  {
    let terms: Vec<String> = BUILTIN_TERMS
      .iter()
      .map(|t| (*t).to_owned())
      .chain(extra.into_iter().map(|t| t.as_ref().to_owned()))
      .collect();
    Self::new(terms)
  }

  /// Normalised terms in blocklist order.
  pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
    self.entries.iter().map(|e| e.term.as_str())
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// `true` iff at least one term occurs in `text` as a whole word.
  pub fn contains_disallowed_term(&self, text: &str) -> bool {
    self.entries.iter().any(|e| e.pattern.is_match(text))
  }

  /// Every term that occurs in `text`, in blocklist order, each listed once.
  pub fn list_matched_terms(&self, text: &str) -> Vec<String> {
    self
      .entries
      .iter()
      .filter(|e| e.pattern.is_match(text))
      .map(|e| e.term.clone())
      .collect()
  }

  /// Replace every occurrence of every term with `*`, one per character of
  /// the matched span. Everything outside matched spans is left untouched.
  ///
  /// Spans are found for all terms against the original text and merged
  /// where they overlap, so a phrase containing a shorter listed term is
  /// masked in full.
  pub fn mask_disallowed_terms(&self, text: &str) -> String {
    let mut spans: Vec<(usize, usize)> = self
      .entries
      .iter()
      .flat_map(|e| e.pattern.find_iter(text).map(|m| (m.start(), m.end())))
      .collect();
    if spans.is_empty() {
      return text.to_owned();
    }
    spans.sort_unstable();

    let mut masked = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut current = spans[0];
    for &(start, end) in &spans[1..] {
      if start <= current.1 {
        current.1 = current.1.max(end);
      } else {
        push_masked(&mut masked, text, &mut cursor, current);
        current = (start, end);
      }
    }
    push_masked(&mut masked, text, &mut cursor, current);
    masked.push_str(&text[cursor..]);
    masked
  }

  /// Matched terms and masked text in one pass over the blocklist.
  pub fn screen(&self, text: &str) -> ScreeningReport {
    ScreeningReport {
      matched_terms: self.list_matched_terms(text),
      masked:        self.mask_disallowed_terms(text),
    }
  }
}

/// Copy `text[cursor..start]` verbatim, then one `*` per char of the span.
fn push_masked(out: &mut String, text: &str, cursor: &mut usize, (start, end): (usize, usize)) {
  out.push_str(&text[*cursor..start]);
  out.extend(std::iter::repeat_n('*', text[start..end].chars().count()));
  *cursor = end;
}

fn compile_term(term: &str) -> Result<Regex> {
  let body = term
    .split_whitespace()
    .map(regex::escape)
    .collect::<Vec<_>>()
    .join(r"\s+");
  let pattern = RegexBuilder::new(&format!(r"\b{body}\b"))
    .case_insensitive(true)
    .build()?;
  Ok(pattern)
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The outcome of screening a piece of text. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningReport {
  pub matched_terms: Vec<String>,
  pub masked:        String,
}

impl ScreeningReport {
  pub fn is_clean(&self) -> bool { self.matched_terms.is_empty() }
}
