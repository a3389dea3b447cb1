//! Rule-based polarity analyzer tuned for short, informal fan comments.
//!
//! Valences use the VADER scale (`-4.0` .. `4.0`). Each text gets a
//! normalized compound score in `[-1.0, 1.0]` plus the share of positive,
//! neutral and negative mass.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use terrace_core::SentimentLabel;

use crate::error::ProviderError;
use crate::types::PolarityScores;
use crate::PolarityAnalyzer;

/// Default compound cutoff for the positive/negative labels.
pub const DEFAULT_POLARITY_CUTOFF: f64 = 0.05;

/// Football vocabulary applied on top of the VADER lexicon when no custom
/// lexicon is supplied.
pub(crate) const FOOTBALL_LEXICON: &[(&str, f64)] = &[
    ("brilliant", 3.5),
    ("worldclass", 3.5),
    ("masterclass", 3.5),
    ("goat", 3.5),
    ("legend", 3.0),
    ("rocket", 2.5),
    ("banger", 2.5),
    ("clinical", 2.5),
    ("terrible", -3.0),
    ("awful", -3.0),
    ("disaster", -3.5),
    ("embarrassing", -3.0),
    ("shocking", -2.5),
    ("pathetic", -3.0),
    ("robbery", -2.5),
    ("rigged", -2.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "nowhere", "neither", "nor", "cannot",
    "without", "rarely", "seldom", "despite", "nope", "aint", "arent", "cant", "couldnt",
    "didnt", "doesnt", "dont", "hadnt", "hasnt", "havent", "isnt", "shouldnt", "wasnt",
    "werent", "wont", "wouldnt",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "completely", "deeply", "enormously", "entirely", "especially",
    "exceptionally", "extremely", "fully", "greatly", "highly", "hugely", "incredibly",
    "insanely", "majorly", "most", "particularly", "proper", "purely", "quite", "really",
    "remarkably", "so", "thoroughly", "totally", "tremendously", "unbelievably", "utterly",
    "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "less", "marginally", "partly", "scarcely",
    "slightly", "somewhat", "sorta",
];

const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_INCREMENT: f64 = 0.18;
const MAX_QUESTION_EMPHASIS: f64 = 0.96;
/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;

struct Token {
    word: String,
    shouting: bool,
}

/// Lexicon-based polarity analyzer.
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    lexicon: HashMap<String, f64>,
    cutoff: f64,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    /// Base lexicon plus the football vocabulary.
    #[must_use]
    pub fn new() -> Self {
        let mut lexicon = base_lexicon();
        lexicon.extend(FOOTBALL_LEXICON.iter().map(|&(w, v)| (w.to_string(), v)));
        Self {
            lexicon,
            cutoff: DEFAULT_POLARITY_CUTOFF,
        }
    }

    /// Base lexicon plus `custom` in place of the football vocabulary.
    #[must_use]
    pub fn with_custom_lexicon(custom: &BTreeMap<String, f64>) -> Self {
        let mut lexicon = base_lexicon();
        lexicon.extend(custom.iter().map(|(w, v)| (w.to_lowercase(), *v)));
        Self {
            lexicon,
            cutoff: DEFAULT_POLARITY_CUTOFF,
        }
    }

    /// Override the compound cutoff used for labeling.
    #[must_use]
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Score a single text.
    #[must_use]
    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        let tokens = tokenize(text);
        let shouting_count = tokens.iter().filter(|t| t.shouting).count();
        let caps_differential = shouting_count > 0 && shouting_count < tokens.len();

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i, caps_differential))
            .collect();

        apply_but_rule(&tokens, &mut valences);

        let emphasis = punctuation_emphasis(text);
        let mut sum: f64 = valences.iter().sum();
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }
        let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);

        let (positive, neutral, negative) = proportions(&valences, emphasis);

        PolarityScores {
            label: self.label_for(compound),
            compound,
            positive,
            neutral,
            negative,
            intensity: compound.abs(),
        }
    }

    fn label_for(&self, compound: f64) -> SentimentLabel {
        if compound >= self.cutoff {
            SentimentLabel::Positive
        } else if compound <= -self.cutoff {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    fn token_valence(&self, tokens: &[Token], i: usize, caps_differential: bool) -> f64 {
        let token = &tokens[i];
        let Some(&base) = self.lexicon.get(&token.word) else {
            return 0.0;
        };
        let direction = base.signum();
        let mut valence = base;

        if token.shouting && caps_differential {
            valence += direction * CAPS_INCREMENT;
        }

        let mut negated = false;
        for distance in 1..=3 {
            let Some(prev) = i.checked_sub(distance).map(|j| &tokens[j]) else {
                break;
            };
            let decay = match distance {
                1 => 1.0,
                2 => 0.95,
                _ => 0.9,
            };
            valence += direction * booster_scalar(&prev.word) * decay;
            negated |= is_negation(&prev.word);
        }

        if negated {
            valence *= NEGATION_SCALAR;
        }
        valence
    }
}

#[async_trait]
impl PolarityAnalyzer for LexiconAnalyzer {
    async fn analyze(&self, texts: &[String]) -> Result<Vec<PolarityScores>, ProviderError> {
        Ok(texts.iter().map(|t| self.polarity_scores(t)).collect())
    }
}

/// The full VADER valence lexicon, keyed by lowercase word.
fn base_lexicon() -> HashMap<String, f64> {
    vader_sentiment::LEXICON
        .iter()
        .map(|(word, valence)| (word.to_lowercase(), *valence))
        .collect()
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| {
            let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if trimmed.is_empty() {
                return None;
            }
            let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
            let shouting = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());
            let word: String = trimmed
                .chars()
                .filter(|&c| c != '\'' && c != '\u{2019}')
                .collect::<String>()
                .to_lowercase();
            Some(Token { word, shouting })
        })
        .collect()
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word)
}

fn booster_scalar(word: &str) -> f64 {
    if BOOSTERS_UP.contains(&word) {
        BOOSTER_INCREMENT
    } else if BOOSTERS_DOWN.contains(&word) {
        -BOOSTER_INCREMENT
    } else {
        0.0
    }
}

/// Contrast after "but" outweighs what came before it.
fn apply_but_rule(tokens: &[Token], valences: &mut [f64]) {
    let Some(pivot) = tokens.iter().position(|t| t.word == "but") else {
        return;
    };
    for (i, valence) in valences.iter_mut().enumerate() {
        if i < pivot {
            *valence *= 0.5;
        } else if i > pivot {
            *valence *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    #[allow(clippy::cast_precision_loss)]
    let exclamation_emphasis = exclamations as f64 * EXCLAMATION_INCREMENT;

    let questions = text.matches('?').count();
    #[allow(clippy::cast_precision_loss)]
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCREMENT,
        _ => MAX_QUESTION_EMPHASIS,
    };

    exclamation_emphasis + question_emphasis
}

/// Positive / neutral / negative shares of the total sentiment mass.
fn proportions(valences: &[f64], emphasis: f64) -> (f64, f64, f64) {
    let mut positive = 0.0;
    let mut negative = 0.0;
    let mut neutral = 0.0;

    for &v in valences {
        if v > 0.0 {
            positive += v + 1.0;
        } else if v < 0.0 {
            negative += v - 1.0;
        } else {
            neutral += 1.0;
        }
    }

    if positive > negative.abs() {
        positive += emphasis;
    } else if positive < negative.abs() {
        negative -= emphasis;
    }

    let total = positive + negative.abs() + neutral;
    if total == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    (positive / total, neutral / total, negative.abs() / total)
}
