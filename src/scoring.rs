//! Deterministic scoring layer for assessment answers
//!
//! This module turns raw questionnaire answers into normalized sub-scores,
//! composite pillar scores, and severity bands. All of it is pure computation
//! over static rule tables; nothing here touches the database or the network.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// ---------------------------------------------------------------------------
/// Pillars & Scales
/// ---------------------------------------------------------------------------

/// Top-level health category used to group assessment topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
  Body,
  Brain,
  Balance,
  Beauty,
}

impl Pillar {
  pub fn as_str(&self) -> &'static str {
    match self {
      Pillar::Body => "body",
      Pillar::Brain => "brain",
      Pillar::Balance => "balance",
      Pillar::Beauty => "beauty",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "body" => Some(Pillar::Body),
      "brain" => Some(Pillar::Brain),
      "balance" => Some(Pillar::Balance),
      "beauty" => Some(Pillar::Beauty),
      _ => None,
    }
  }
}

/// Declared range of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
  /// 0-100
  Percent,
  /// 0-5
  FivePoint,
}

impl ScoreScale {
  pub fn ceiling(&self) -> f64 {
    match self {
      ScoreScale::Percent => 100.0,
      ScoreScale::FivePoint => 5.0,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Assessment Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
  SleepSymptom,
  Nutrition,
  Movement,
  StressCheck,
  HormoneCompass,
}

impl AssessmentType {
  pub fn as_str(&self) -> &'static str {
    match self {
      AssessmentType::SleepSymptom => "sleep-symptom",
      AssessmentType::Nutrition => "nutrition",
      AssessmentType::Movement => "movement",
      AssessmentType::StressCheck => "stress-check",
      AssessmentType::HormoneCompass => "hormone-compass",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "sleep-symptom" => Some(AssessmentType::SleepSymptom),
      "nutrition" => Some(AssessmentType::Nutrition),
      "movement" => Some(AssessmentType::Movement),
      "stress-check" => Some(AssessmentType::StressCheck),
      "hormone-compass" => Some(AssessmentType::HormoneCompass),
      _ => None,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Severity Bands
/// ---------------------------------------------------------------------------
///
/// Two threshold tables exist on purpose: symptom-style assessments score
/// 0-100 with four bands, the hormone compass scores 0-5 with five bands.
/// Boundary values belong to the higher band.

/// Four-band table for 0-100 scores, cut points at 40/60/80
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentBand {
  Poor,
  Fair,
  Good,
  Excellent,
}

impl PercentBand {
  pub fn classify(score: f64) -> Self {
    match score {
      s if s >= 80.0 => PercentBand::Excellent,
      s if s >= 60.0 => PercentBand::Good,
      s if s >= 40.0 => PercentBand::Fair,
      _ => PercentBand::Poor,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      PercentBand::Poor => "poor",
      PercentBand::Fair => "fair",
      PercentBand::Good => "good",
      PercentBand::Excellent => "excellent",
    }
  }

  /// Ordinal position, higher = healthier
  pub fn rank(&self) -> u8 {
    match self {
      PercentBand::Poor => 0,
      PercentBand::Fair => 1,
      PercentBand::Good => 2,
      PercentBand::Excellent => 3,
    }
  }
}

/// Five-band table for 0-5 scores, cut points at 1.5/2.5/3.5/4.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompassBand {
  Critical,
  Struggling,
  Challenges,
  Good,
  Thriving,
}

impl CompassBand {
  pub fn classify(score: f64) -> Self {
    match score {
      s if s >= 4.5 => CompassBand::Thriving,
      s if s >= 3.5 => CompassBand::Good,
      s if s >= 2.5 => CompassBand::Challenges,
      s if s >= 1.5 => CompassBand::Struggling,
      _ => CompassBand::Critical,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      CompassBand::Critical => "critical",
      CompassBand::Struggling => "struggling",
      CompassBand::Challenges => "challenges",
      CompassBand::Good => "good",
      CompassBand::Thriving => "thriving",
    }
  }

  /// Ordinal position, higher = healthier
  pub fn rank(&self) -> u8 {
    match self {
      CompassBand::Critical => 0,
      CompassBand::Struggling => 1,
      CompassBand::Challenges => 2,
      CompassBand::Good => 3,
      CompassBand::Thriving => 4,
    }
  }
}

/// A band from either table, kept distinct rather than unified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBand {
  Percent(PercentBand),
  Compass(CompassBand),
}

impl SeverityBand {
  pub fn label(&self) -> &'static str {
    match self {
      SeverityBand::Percent(b) => b.label(),
      SeverityBand::Compass(b) => b.label(),
    }
  }

  /// True when the band is low enough to warrant interventions
  pub fn needs_intervention(&self) -> bool {
    match self {
      SeverityBand::Percent(b) => matches!(b, PercentBand::Poor | PercentBand::Fair),
      SeverityBand::Compass(b) => matches!(
        b,
        CompassBand::Critical | CompassBand::Struggling | CompassBand::Challenges
      ),
    }
  }

  /// True for the lowest band of either table; sources `immediate` items
  pub fn is_urgent(&self) -> bool {
    match self {
      SeverityBand::Percent(b) => matches!(b, PercentBand::Poor),
      SeverityBand::Compass(b) => matches!(b, CompassBand::Critical),
    }
  }
}

impl Serialize for SeverityBand {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.label())
  }
}

/// ---------------------------------------------------------------------------
/// Question Rule Tables (normalizer data)
/// ---------------------------------------------------------------------------
///
/// Each assessment type has a fixed option -> sub-score table. Unknown or
/// missing answers contribute the rule's neutral default so partial
/// completion degrades to "fair" style scores instead of zeros.

pub struct QuestionRule {
  pub question: &'static str,
  pub dimension: &'static str,
  pub options: &'static [(&'static str, f64)],
  pub neutral: f64,
}

static SLEEP_RULES: &[QuestionRule] = &[
  QuestionRule {
    question: "sleep_quality",
    dimension: "sleepQuality",
    options: &[
      ("excellent", 90.0),
      ("good", 70.0),
      ("fair", 50.0),
      ("poor", 25.0),
      ("very_poor", 10.0),
    ],
    neutral: 50.0,
  },
  QuestionRule {
    question: "fall_asleep",
    dimension: "fallAsleep",
    options: &[
      ("under_15_min", 90.0),
      ("15_30_min", 70.0),
      ("30_60_min", 40.0),
      ("over_60_min", 20.0),
    ],
    neutral: 50.0,
  },
  QuestionRule {
    question: "night_wakings",
    dimension: "nightWakings",
    options: &[
      ("never", 95.0),
      ("once", 75.0),
      ("twice", 45.0),
      ("three_or_more", 20.0),
    ],
    neutral: 50.0,
  },
  QuestionRule {
    question: "morning_rested",
    dimension: "morningRested",
    options: &[
      ("rested", 90.0),
      ("somewhat_rested", 60.0),
      ("tired", 35.0),
      ("exhausted", 15.0),
    ],
    neutral: 50.0,
  },
];

// Nutrition sub-scores are deduction points taken off a ceiling of 100,
// so a "worse" answer maps to a larger value here.
static NUTRITION_RULES: &[QuestionRule] = &[
  QuestionRule {
    question: "processed_food",
    dimension: "processedFood",
    options: &[
      ("daily", 25.0),
      ("often", 15.0),
      ("sometimes", 8.0),
      ("rarely", 0.0),
    ],
    neutral: 8.0,
  },
  QuestionRule {
    question: "added_sugar",
    dimension: "addedSugar",
    options: &[("high", 20.0), ("moderate", 10.0), ("low", 0.0)],
    neutral: 10.0,
  },
  QuestionRule {
    question: "vegetable_servings",
    dimension: "vegetables",
    options: &[
      ("none", 20.0),
      ("one_to_two", 10.0),
      ("three_to_four", 5.0),
      ("five_plus", 0.0),
    ],
    neutral: 10.0,
  },
  QuestionRule {
    question: "hydration",
    dimension: "hydration",
    options: &[("under_1l", 15.0), ("one_to_2l", 5.0), ("over_2l", 0.0)],
    neutral: 5.0,
  },
  QuestionRule {
    question: "alcohol",
    dimension: "alcohol",
    options: &[("daily", 15.0), ("weekly", 5.0), ("rarely_never", 0.0)],
    neutral: 5.0,
  },
  QuestionRule {
    question: "late_night_eating",
    dimension: "lateNightEating",
    options: &[("most_nights", 15.0), ("some_nights", 8.0), ("rarely", 0.0)],
    neutral: 8.0,
  },
];

static MOVEMENT_RULES: &[QuestionRule] = &[QuestionRule {
  question: "active_days",
  dimension: "activeDays",
  options: &[
    ("zero", 0.0),
    ("one_two", 1.5),
    ("three_four", 3.5),
    ("five_six", 5.5),
    ("daily", 7.0),
  ],
  neutral: 3.5,
}];

static STRESS_RULES: &[QuestionRule] = &[
  QuestionRule {
    question: "feel_calm",
    dimension: "calm",
    options: &[("often", 85.0), ("sometimes", 55.0), ("rarely", 25.0)],
    neutral: 55.0,
  },
  QuestionRule {
    question: "overwhelmed",
    dimension: "overwhelm",
    options: &[("rarely", 90.0), ("weekly", 60.0), ("daily", 25.0)],
    neutral: 60.0,
  },
  QuestionRule {
    question: "stress_sleep_impact",
    dimension: "sleepImpact",
    options: &[("never", 90.0), ("sometimes", 55.0), ("most_nights", 20.0)],
    neutral: 55.0,
  },
];

// Hormone compass scores on 0-5; two questions feed the hotFlashes
// dimension and are averaged by the normalizer.
static HORMONE_RULES: &[QuestionRule] = &[
  QuestionRule {
    question: "hot_flash_frequency",
    dimension: "hotFlashes",
    options: &[
      ("never", 5.0),
      ("monthly", 4.0),
      ("weekly", 3.0),
      ("daily", 1.5),
      ("several_daily", 0.5),
    ],
    neutral: 2.5,
  },
  QuestionRule {
    question: "night_sweats",
    dimension: "hotFlashes",
    options: &[("never", 5.0), ("occasionally", 3.5), ("frequently", 1.5)],
    neutral: 2.5,
  },
  QuestionRule {
    question: "mood_swings",
    dimension: "moodSwings",
    options: &[("rarely", 4.5), ("weekly", 3.0), ("daily", 1.5)],
    neutral: 2.5,
  },
  QuestionRule {
    question: "energy_level",
    dimension: "energy",
    options: &[
      ("high", 4.5),
      ("steady", 3.5),
      ("low_afternoons", 2.5),
      ("depleted", 1.0),
    ],
    neutral: 2.5,
  },
];

// Fallback for unmodeled assessment types: a single neutral dimension so
// downstream scoring and recommendations stay obtainable.
static GENERIC_RULES: &[QuestionRule] = &[QuestionRule {
  question: "overall",
  dimension: "overall",
  options: &[],
  neutral: 50.0,
}];

fn question_rules(assessment_type: Option<AssessmentType>) -> &'static [QuestionRule] {
  match assessment_type {
    Some(AssessmentType::SleepSymptom) => SLEEP_RULES,
    Some(AssessmentType::Nutrition) => NUTRITION_RULES,
    Some(AssessmentType::Movement) => MOVEMENT_RULES,
    Some(AssessmentType::StressCheck) => STRESS_RULES,
    Some(AssessmentType::HormoneCompass) => HORMONE_RULES,
    None => GENERIC_RULES,
  }
}

/// ---------------------------------------------------------------------------
/// Answer Normalizer
/// ---------------------------------------------------------------------------

/// Dimension name -> numeric sub-score
pub type SubScores = BTreeMap<String, f64>;

/// Map one answer set into sub-scores.
///
/// `prior_answers` carries answers from an earlier (e.g. guest) session used
/// to pre-populate questions the current set left blank; it is explicit
/// context, not ambient state. Unknown option ids and fully missing answers
/// fall back to the rule's neutral default.
pub fn normalize_answers(
  assessment_type: &str,
  answers: &HashMap<String, String>,
  prior_answers: Option<&HashMap<String, String>>,
) -> SubScores {
  let rules = question_rules(AssessmentType::parse(assessment_type));

  // Dimensions fed by several questions are averaged.
  let mut sums: BTreeMap<&str, (f64, u32)> = BTreeMap::new();

  for rule in rules {
    let selected = answers
      .get(rule.question)
      .or_else(|| prior_answers.and_then(|p| p.get(rule.question)));

    let value = selected
      .and_then(|opt| {
        rule
          .options
          .iter()
          .find(|(id, _)| *id == opt.as_str())
          .map(|(_, v)| *v)
      })
      .unwrap_or(rule.neutral);

    let entry = sums.entry(rule.dimension).or_insert((0.0, 0));
    entry.0 += value;
    entry.1 += 1;
  }

  sums
    .into_iter()
    .map(|(dim, (sum, count))| (dim.to_string(), sum / count as f64))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Pillar Scorer
/// ---------------------------------------------------------------------------

/// One named pillar/topic score with its derived severity band
#[derive(Debug, Clone, Serialize)]
pub struct CompositeScore {
  pub pillar: Pillar,
  pub topic: String,
  pub score: f64,
  pub scale: ScoreScale,
  pub band: SeverityBand,
}

impl CompositeScore {
  fn percent(pillar: Pillar, topic: &str, score: f64) -> Self {
    let score = score.clamp(0.0, ScoreScale::Percent.ceiling());
    Self {
      pillar,
      topic: topic.to_string(),
      score,
      scale: ScoreScale::Percent,
      band: SeverityBand::Percent(PercentBand::classify(score)),
    }
  }

  fn five_point(pillar: Pillar, topic: &str, score: f64) -> Self {
    let score = score.clamp(0.0, ScoreScale::FivePoint.ceiling());
    Self {
      pillar,
      topic: topic.to_string(),
      score,
      scale: ScoreScale::FivePoint,
      band: SeverityBand::Compass(CompassBand::classify(score)),
    }
  }

  /// Score rescaled onto 0-100 regardless of declared scale
  pub fn percent_equivalent(&self) -> f64 {
    match self.scale {
      ScoreScale::Percent => self.score,
      ScoreScale::FivePoint => self.score * 20.0,
    }
  }
}

/// Composite scoring strategy, keyed per assessment type.
///
/// Different assessment families use different philosophies; each variant
/// carries its own data so the tables stay separate from control flow.
pub enum ScoringRule {
  /// Weighted average of percent sub-scores; dimensions missing from the
  /// sub-score map are skipped and the weights renormalized
  WeightedAverage {
    pillar: Pillar,
    topic: &'static str,
    weights: &'static [(&'static str, f64)],
  },
  /// Ceiling minus the sum of all sub-scores (deduction points), floored at 0
  DeductFromCeiling {
    pillar: Pillar,
    topic: &'static str,
    ceiling: f64,
  },
  /// One sub-score scaled proportionally onto 0-100
  ScaledDimension {
    pillar: Pillar,
    topic: &'static str,
    dimension: &'static str,
    max: f64,
  },
  /// Each listed dimension becomes its own 0-5 composite
  PerDimension {
    pillar: Pillar,
    topics: &'static [(&'static str, &'static str)],
  },
}

impl ScoringRule {
  pub fn apply(&self, subs: &SubScores) -> Vec<CompositeScore> {
    match self {
      ScoringRule::WeightedAverage {
        pillar,
        topic,
        weights,
      } => {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (dim, weight) in *weights {
          if let Some(value) = subs.get(*dim) {
            weighted += value * weight;
            total_weight += weight;
          }
        }
        let score = if total_weight > 0.0 {
          weighted / total_weight
        } else {
          50.0
        };
        vec![CompositeScore::percent(*pillar, topic, score)]
      }

      ScoringRule::DeductFromCeiling {
        pillar,
        topic,
        ceiling,
      } => {
        let deductions: f64 = subs.values().sum();
        vec![CompositeScore::percent(*pillar, topic, ceiling - deductions)]
      }

      ScoringRule::ScaledDimension {
        pillar,
        topic,
        dimension,
        max,
      } => {
        let value = subs.get(*dimension).copied().unwrap_or(max / 2.0);
        vec![CompositeScore::percent(*pillar, topic, value / max * 100.0)]
      }

      ScoringRule::PerDimension { pillar, topics } => topics
        .iter()
        .filter_map(|(dim, topic)| {
          subs
            .get(*dim)
            .map(|value| CompositeScore::five_point(*pillar, topic, *value))
        })
        .collect(),
    }
  }
}

static SLEEP_SCORING: &[ScoringRule] = &[ScoringRule::WeightedAverage {
  pillar: Pillar::Body,
  topic: "sleep",
  weights: &[
    ("sleepQuality", 0.35),
    ("fallAsleep", 0.25),
    ("nightWakings", 0.25),
    ("morningRested", 0.15),
  ],
}];

static NUTRITION_SCORING: &[ScoringRule] = &[ScoringRule::DeductFromCeiling {
  pillar: Pillar::Body,
  topic: "nutrition",
  ceiling: 100.0,
}];

static MOVEMENT_SCORING: &[ScoringRule] = &[ScoringRule::ScaledDimension {
  pillar: Pillar::Body,
  topic: "movement",
  dimension: "activeDays",
  max: 7.0,
}];

static STRESS_SCORING: &[ScoringRule] = &[ScoringRule::WeightedAverage {
  pillar: Pillar::Brain,
  topic: "stress",
  weights: &[("calm", 0.4), ("overwhelm", 0.35), ("sleepImpact", 0.25)],
}];

static HORMONE_SCORING: &[ScoringRule] = &[ScoringRule::PerDimension {
  pillar: Pillar::Balance,
  topics: &[
    ("hotFlashes", "hot-flashes"),
    ("moodSwings", "mood-swings"),
    ("energy", "energy"),
  ],
}];

static GENERIC_SCORING: &[ScoringRule] = &[ScoringRule::WeightedAverage {
  pillar: Pillar::Body,
  topic: "general",
  weights: &[("overall", 1.0)],
}];

fn scoring_rules(assessment_type: Option<AssessmentType>) -> &'static [ScoringRule] {
  match assessment_type {
    Some(AssessmentType::SleepSymptom) => SLEEP_SCORING,
    Some(AssessmentType::Nutrition) => NUTRITION_SCORING,
    Some(AssessmentType::Movement) => MOVEMENT_SCORING,
    Some(AssessmentType::StressCheck) => STRESS_SCORING,
    Some(AssessmentType::HormoneCompass) => HORMONE_SCORING,
    None => GENERIC_SCORING,
  }
}

/// ---------------------------------------------------------------------------
/// Assessment Scoring Entry Point
/// ---------------------------------------------------------------------------

/// Sub-scores plus composite scores for one completed answer set
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAssessment {
  pub sub_scores: SubScores,
  pub composite_scores: Vec<CompositeScore>,
}

/// Score one answer set end to end: normalize, apply the type's strategies,
/// classify. Unrecognized assessment types take the generic neutral path
/// rather than failing.
pub fn score_assessment(
  assessment_type: &str,
  answers: &HashMap<String, String>,
  prior_answers: Option<&HashMap<String, String>>,
) -> ScoredAssessment {
  let parsed = AssessmentType::parse(assessment_type);
  let sub_scores = normalize_answers(assessment_type, answers, prior_answers);

  let composite_scores = scoring_rules(parsed)
    .iter()
    .flat_map(|rule| rule.apply(&sub_scores))
    .collect();

  ScoredAssessment {
    sub_scores,
    composite_scores,
  }
}

/// Aggregate "overall" score on 0-100 across composites of either scale.
/// Used as the sustained score for biological-age projection.
pub fn overall_score(composites: &[CompositeScore]) -> Option<f64> {
  if composites.is_empty() {
    return None;
  }
  let sum: f64 = composites.iter().map(|c| c.percent_equivalent()).sum();
  Some(sum / composites.len() as f64)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
