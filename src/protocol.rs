//! Protocol merging pipeline
//!
//! Pure steps of protocol generation: select the focus areas from a user's
//! composite scores, resolve catalog candidates for each, deduplicate by
//! (type, name), fold in best-effort LLM suggestions, and assign priority
//! tiers. Persistence is the caller's concern; everything here is plain data
//! in, plain data out, so every rule is unit-testable without a database.

use serde::Serialize;
use std::collections::HashSet;

use crate::catalog::{self, InterventionType, PriorityTier, TimeOfDay};
use crate::llm::{Augmentation, SuggestedItem};
use crate::scoring::{CompositeScore, Pillar};

/// ---------------------------------------------------------------------------
/// Focus Areas
/// ---------------------------------------------------------------------------

/// A (pillar, topic, severity) triple selected for intervention
#[derive(Debug, Clone, Serialize)]
pub struct FocusArea {
  pub pillar: Pillar,
  pub topic: String,
  pub band: String,
  pub score: f64,
  /// Lowest band of its table; sources `immediate` items
  pub urgent: bool,
}

impl FocusArea {
  /// Human-readable line for logs and the augmentation prompt
  pub fn describe(&self) -> String {
    format!("{}: {} ({:.0})", self.topic, self.band, self.score)
  }
}

/// Pick out the scores low enough to act on. Healthy bands produce no focus
/// area; an empty result is a legitimate outcome for a healthy user.
pub fn select_focus_areas(scores: &[CompositeScore]) -> Vec<FocusArea> {
  scores
    .iter()
    .filter(|c| c.band.needs_intervention())
    .map(|c| FocusArea {
      pillar: c.pillar,
      topic: c.topic.clone(),
      band: c.band.label().to_string(),
      score: c.score,
      urgent: c.band.is_urgent(),
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Merged Items
/// ---------------------------------------------------------------------------

/// One intervention after merging, ready for persistence
#[derive(Debug, Clone, Serialize)]
pub struct MergedItem {
  pub item_type: InterventionType,
  pub name: String,
  pub frequency: String,
  pub time_of_day: Vec<TimeOfDay>,
  pub rationale: String,
  pub priority: PriorityTier,
  /// Where this item came from, e.g. "sleep scored 22 (poor)"
  pub source: String,
}

impl MergedItem {
  /// Dedup key: case-insensitive (type, name)
  fn key(&self) -> (InterventionType, String) {
    (self.item_type, self.name.to_lowercase())
  }
}

/// Resolve catalog candidates for every focus area, tagging each item with
/// its source and priority tier. Duplicates across focus areas survive here;
/// `dedup_items` removes them.
pub fn resolve_candidates(focus_areas: &[FocusArea]) -> Vec<MergedItem> {
  let mut items = Vec::new();

  for focus in focus_areas {
    for candidate in catalog::resolve(focus.pillar, &focus.topic, &focus.band) {
      let priority = if focus.urgent {
        PriorityTier::Immediate
      } else if candidate.optimization {
        PriorityTier::Optimization
      } else {
        PriorityTier::Foundation
      };

      items.push(MergedItem {
        item_type: candidate.item_type,
        name: candidate.name.to_string(),
        frequency: candidate.frequency.to_string(),
        time_of_day: candidate.time_of_day.to_vec(),
        rationale: candidate.rationale.to_string(),
        priority,
        source: format!("{} scored {:.0} ({})", focus.topic, focus.score, focus.band),
      });
    }
  }

  items
}

/// Deduplicate by (type, name); first occurrence wins, later duplicates are
/// dropped silently since multiple topics commonly recommend the same item.
pub fn dedup_items(items: Vec<MergedItem>) -> Vec<MergedItem> {
  let mut seen = HashSet::new();
  items
    .into_iter()
    .filter(|item| seen.insert(item.key()))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Augmentation Merge
/// ---------------------------------------------------------------------------

/// Fold augmentation output into an already-deduplicated item list.
///
/// Strictly additive: suggestions duplicating an existing (type, name) pair
/// are dropped, suggestions with an unknown intervention type are skipped,
/// and an unavailable augmentation leaves the list untouched. Returns the
/// number of items appended.
pub fn merge_augmentation(items: &mut Vec<MergedItem>, augmentation: Augmentation) -> usize {
  let suggested = match augmentation {
    Augmentation::Available(suggested) => suggested,
    Augmentation::Unavailable(reason) => {
      log::warn!("augmentation unavailable, keeping local protocol: {}", reason);
      return 0;
    }
  };

  let mut seen: HashSet<(InterventionType, String)> =
    items.iter().map(|i| i.key()).collect();
  let mut appended = 0;

  for suggestion in suggested {
    let Some(item) = merged_from_suggestion(suggestion) else {
      continue;
    };
    if seen.insert(item.key()) {
      items.push(item);
      appended += 1;
    }
  }

  appended
}

fn merged_from_suggestion(suggestion: SuggestedItem) -> Option<MergedItem> {
  let item_type = InterventionType::parse(&suggestion.item_type)?;
  if suggestion.name.trim().is_empty() {
    return None;
  }

  let time_of_day = suggestion
    .time_of_day
    .unwrap_or_default()
    .iter()
    .filter_map(|s| TimeOfDay::parse(s))
    .collect();

  Some(MergedItem {
    item_type,
    name: suggestion.name.trim().to_string(),
    frequency: suggestion.frequency.unwrap_or_else(|| "daily".to_string()),
    time_of_day,
    rationale: suggestion.rationale.unwrap_or_default(),
    priority: PriorityTier::Foundation,
    source: "model suggestion".to_string(),
  })
}

/// ---------------------------------------------------------------------------
/// Pipeline Entry Point (pure part)
/// ---------------------------------------------------------------------------

/// Run the local merge: focus selection, catalog resolution, dedup. The
/// caller layers augmentation and persistence on top.
pub fn build_local_protocol(scores: &[CompositeScore]) -> (Vec<FocusArea>, Vec<MergedItem>) {
  let focus_areas = select_focus_areas(scores);
  let items = dedup_items(resolve_candidates(&focus_areas));
  (focus_areas, items)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
