//! Static intervention catalog
//!
//! Read-only reference data keyed by (pillar, topic, severity band).
//! Versioned by deployment, not user-specific, and deliberately sparse above
//! the "fair"/"challenges" bands: no action is recommended for topics that
//! are already healthy. Unknown keys resolve to an empty slice so the merger
//! can proceed with whatever topics are modeled.

use serde::{Deserialize, Serialize};

use crate::scoring::Pillar;

/// ---------------------------------------------------------------------------
/// Item Vocabulary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionType {
  Supplement,
  Exercise,
  Diet,
  Habit,
  Therapy,
}

impl InterventionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      InterventionType::Supplement => "supplement",
      InterventionType::Exercise => "exercise",
      InterventionType::Diet => "diet",
      InterventionType::Habit => "habit",
      InterventionType::Therapy => "therapy",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "supplement" => Some(InterventionType::Supplement),
      "exercise" => Some(InterventionType::Exercise),
      "diet" => Some(InterventionType::Diet),
      "habit" => Some(InterventionType::Habit),
      "therapy" => Some(InterventionType::Therapy),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
  Morning,
  Afternoon,
  Evening,
  Bedtime,
}

impl TimeOfDay {
  pub fn as_str(&self) -> &'static str {
    match self {
      TimeOfDay::Morning => "morning",
      TimeOfDay::Afternoon => "afternoon",
      TimeOfDay::Evening => "evening",
      TimeOfDay::Bedtime => "bedtime",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "morning" => Some(TimeOfDay::Morning),
      "afternoon" => Some(TimeOfDay::Afternoon),
      "evening" => Some(TimeOfDay::Evening),
      "bedtime" => Some(TimeOfDay::Bedtime),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
  Immediate,
  Foundation,
  Optimization,
}

impl PriorityTier {
  pub fn as_str(&self) -> &'static str {
    match self {
      PriorityTier::Immediate => "immediate",
      PriorityTier::Foundation => "foundation",
      PriorityTier::Optimization => "optimization",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "immediate" => Some(PriorityTier::Immediate),
      "foundation" => Some(PriorityTier::Foundation),
      "optimization" => Some(PriorityTier::Optimization),
      _ => None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Catalog Data
/// ---------------------------------------------------------------------------

/// One candidate intervention as authored in the catalog
pub struct CatalogItem {
  pub item_type: InterventionType,
  pub name: &'static str,
  pub frequency: &'static str,
  pub time_of_day: &'static [TimeOfDay],
  pub rationale: &'static str,
  /// Catalog entries can opt into the `optimization` tier; everything else
  /// defaults to `foundation` (or `immediate` when sourced from the lowest
  /// band).
  pub optimization: bool,
}

struct CatalogEntry {
  pillar: Pillar,
  topic: &'static str,
  band: &'static str,
  items: &'static [CatalogItem],
}

static CATALOG: &[CatalogEntry] = &[
  // -------------------------------------------------------------- body/sleep
  CatalogEntry {
    pillar: Pillar::Body,
    topic: "sleep",
    band: "poor",
    items: &[
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "Magnesium Glycinate",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Bedtime],
        rationale: "Supports deeper sleep and reduces nighttime muscle tension",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Sleep Hygiene Routine",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Evening],
        rationale: "Fixed wind-down and screen cutoff an hour before bed",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Consistent Wake Time",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Anchors circadian rhythm; the single strongest sleep lever",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Body,
    topic: "sleep",
    band: "fair",
    items: &[
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "Magnesium Glycinate",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Bedtime],
        rationale: "Supports deeper sleep and reduces nighttime muscle tension",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Morning Light Exposure",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Ten minutes of outdoor light within an hour of waking",
        optimization: true,
      },
    ],
  },
  // ---------------------------------------------------------- body/nutrition
  CatalogEntry {
    pillar: Pillar::Body,
    topic: "nutrition",
    band: "poor",
    items: &[
      CatalogItem {
        item_type: InterventionType::Diet,
        name: "Protein-First Breakfast",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "30g of protein at breakfast stabilizes energy and appetite",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Diet,
        name: "Ultra-Processed Food Swap",
        frequency: "daily",
        time_of_day: &[],
        rationale: "Replace one processed meal a day with whole food",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "Omega-3 Fish Oil",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Covers essential fatty acids a low-quality diet misses",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Body,
    topic: "nutrition",
    band: "fair",
    items: &[
      CatalogItem {
        item_type: InterventionType::Diet,
        name: "Vegetable Doubling",
        frequency: "daily",
        time_of_day: &[],
        rationale: "Double the vegetable portion at one meal a day",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Hydration Target",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning, TimeOfDay::Afternoon],
        rationale: "Two liters before late afternoon; caffeine does not count",
        optimization: true,
      },
    ],
  },
  // ----------------------------------------------------------- body/movement
  CatalogEntry {
    pillar: Pillar::Body,
    topic: "movement",
    band: "poor",
    items: &[
      CatalogItem {
        item_type: InterventionType::Exercise,
        name: "Daily Walk",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning, TimeOfDay::Evening],
        rationale: "Thirty minutes of zone-1 walking; consistency over intensity",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Exercise,
        name: "Strength Training Basics",
        frequency: "2x weekly",
        time_of_day: &[],
        rationale: "Two short full-body sessions preserve muscle and bone density",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Body,
    topic: "movement",
    band: "fair",
    items: &[
      CatalogItem {
        item_type: InterventionType::Exercise,
        name: "Strength Training Basics",
        frequency: "2x weekly",
        time_of_day: &[],
        rationale: "Two short full-body sessions preserve muscle and bone density",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Exercise,
        name: "Zone 2 Cardio Block",
        frequency: "weekly",
        time_of_day: &[],
        rationale: "One 45-minute conversational-pace session a week",
        optimization: true,
      },
    ],
  },
  // ------------------------------------------------------------ brain/stress
  CatalogEntry {
    pillar: Pillar::Brain,
    topic: "stress",
    band: "poor",
    items: &[
      CatalogItem {
        item_type: InterventionType::Therapy,
        name: "Breathwork Practice",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning, TimeOfDay::Evening],
        rationale: "Five minutes of paced breathing downshifts the stress response",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "Ashwagandha",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Evening],
        rationale: "Adaptogen with evidence for lowering perceived stress",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Worry Journal",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Evening],
        rationale: "Externalizing open loops before bed reduces rumination",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Brain,
    topic: "stress",
    band: "fair",
    items: &[
      CatalogItem {
        item_type: InterventionType::Therapy,
        name: "Breathwork Practice",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Five minutes of paced breathing downshifts the stress response",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Screen-Free Hour",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Evening],
        rationale: "An hour without inputs lowers evening cortisol",
        optimization: true,
      },
    ],
  },
  // ---------------------------------------------------- balance/hot-flashes
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "hot-flashes",
    band: "critical",
    items: &[
      CatalogItem {
        item_type: InterventionType::Therapy,
        name: "Clinician Consultation",
        frequency: "once",
        time_of_day: &[],
        rationale: "Severe vasomotor symptoms warrant a medical review",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Cooling Sleep Environment",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Bedtime],
        rationale: "Bedroom at 18°C with breathable bedding blunts night sweats",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Diet,
        name: "Trigger Tracking",
        frequency: "daily",
        time_of_day: &[],
        rationale: "Log alcohol, caffeine and spice against flash episodes",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "hot-flashes",
    band: "struggling",
    items: &[
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Cooling Sleep Environment",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Bedtime],
        rationale: "Bedroom at 18°C with breathable bedding blunts night sweats",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Diet,
        name: "Trigger Tracking",
        frequency: "daily",
        time_of_day: &[],
        rationale: "Log alcohol, caffeine and spice against flash episodes",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "hot-flashes",
    band: "challenges",
    items: &[CatalogItem {
      item_type: InterventionType::Habit,
      name: "Layered Clothing Strategy",
      frequency: "daily",
      time_of_day: &[],
      rationale: "Quick temperature control shortens individual episodes",
      optimization: true,
    }],
  },
  // ---------------------------------------------------- balance/mood-swings
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "mood-swings",
    band: "critical",
    items: &[
      CatalogItem {
        item_type: InterventionType::Therapy,
        name: "Talk Therapy Referral",
        frequency: "weekly",
        time_of_day: &[],
        rationale: "Persistent severe mood disruption needs professional support",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "Vitamin D3",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Deficiency is common and correlates with low mood",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "mood-swings",
    band: "struggling",
    items: &[
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "Vitamin D3",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Deficiency is common and correlates with low mood",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Mood Logging",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Evening],
        rationale: "A two-minute log surfaces cycle patterns worth discussing",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "mood-swings",
    band: "challenges",
    items: &[CatalogItem {
      item_type: InterventionType::Exercise,
      name: "Outdoor Movement Snack",
      frequency: "daily",
      time_of_day: &[TimeOfDay::Afternoon],
      rationale: "Ten minutes outdoors reliably lifts afternoon mood dips",
      optimization: true,
    }],
  },
  // --------------------------------------------------------- balance/energy
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "energy",
    band: "critical",
    items: &[
      CatalogItem {
        item_type: InterventionType::Therapy,
        name: "Blood Panel Review",
        frequency: "once",
        time_of_day: &[],
        rationale: "Rule out iron, thyroid and B12 causes of depletion",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "B-Complex",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Supports cellular energy metabolism while causes are assessed",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "energy",
    band: "struggling",
    items: &[
      CatalogItem {
        item_type: InterventionType::Supplement,
        name: "B-Complex",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Morning],
        rationale: "Supports cellular energy metabolism while causes are assessed",
        optimization: false,
      },
      CatalogItem {
        item_type: InterventionType::Habit,
        name: "Caffeine Cutoff",
        frequency: "daily",
        time_of_day: &[TimeOfDay::Afternoon],
        rationale: "No caffeine after 14:00 protects the sleep that restores energy",
        optimization: false,
      },
    ],
  },
  CatalogEntry {
    pillar: Pillar::Balance,
    topic: "energy",
    band: "challenges",
    items: &[CatalogItem {
      item_type: InterventionType::Habit,
      name: "Afternoon Daylight Break",
      frequency: "daily",
      time_of_day: &[TimeOfDay::Afternoon],
      rationale: "A short outdoor break counteracts the circadian afternoon dip",
      optimization: true,
    }],
  },
  // ---------------------------------------------------- beauty/skin-changes
  CatalogEntry {
    pillar: Pillar::Beauty,
    topic: "skin-changes",
    band: "fair",
    items: &[CatalogItem {
      item_type: InterventionType::Supplement,
      name: "Collagen Peptides",
      frequency: "daily",
      time_of_day: &[TimeOfDay::Morning],
      rationale: "Supports skin elasticity alongside adequate protein intake",
      optimization: true,
    }],
  },
];

/// ---------------------------------------------------------------------------
/// Lookup
/// ---------------------------------------------------------------------------

/// Candidates for one (pillar, topic, band) triple. Unknown keys return an
/// empty slice rather than failing.
pub fn resolve(pillar: Pillar, topic: &str, band: &str) -> &'static [CatalogItem] {
  CATALOG
    .iter()
    .find(|e| e.pillar == pillar && e.topic == topic && e.band == band)
    .map(|e| e.items)
    .unwrap_or(&[])
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
