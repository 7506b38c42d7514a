use std::borrow::Cow;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Foreign-jurisdiction and foreign-cloud markers suggesting data leaves Qatar.
pub const DEFAULT_RESIDENCY_INDICATORS: [&str; 7] = [
    "AWS",
    "Azure",
    "Google Cloud",
    "Ireland",
    "Singapore",
    "Frankfurt",
    "Virginia",
];
pub const DEFAULT_REQUIRED_CAPITAL: u64 = 5_000_000;
pub const DEFAULT_CAPITAL_CURRENCY: &str = "QAR";
const COMPLIANCE_OFFICER_PHRASE: &str = "compliance officer";

/// Named signal raised by a gap heuristic, independent of topic scoring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapFlag(Cow<'static, str>);

impl GapFlag {
    pub const DATA_RESIDENCY: GapFlag = GapFlag(Cow::Borrowed("Data Residency Issue"));
    pub const MISSING_COMPLIANCE_OFFICER: GapFlag =
        GapFlag(Cow::Borrowed("Missing Compliance Officer"));
    pub const CAPITAL_DEFICIENCY: GapFlag = GapFlag(Cow::Borrowed("Capital Deficiency"));

    pub fn custom(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GapFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Standalone predicate over document text that raises one flag.
pub trait GapRule: Send + Sync {
    fn flag(&self) -> GapFlag;
    fn evaluate(&self, text: &str) -> bool;
}

/// Raises `Data Residency Issue` when any indicator token appears verbatim.
#[derive(Debug, Clone)]
pub struct ResidencyIndicatorRule {
    indicators: Vec<String>,
}

impl ResidencyIndicatorRule {
    pub fn new<I, S>(indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let indicators = indicators
            .into_iter()
            .map(Into::into)
            .filter(|indicator: &String| !indicator.is_empty())
            .collect();
        Self { indicators }
    }

    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }
}

impl Default for ResidencyIndicatorRule {
    fn default() -> Self {
        Self::new(DEFAULT_RESIDENCY_INDICATORS)
    }
}

impl GapRule for ResidencyIndicatorRule {
    fn flag(&self) -> GapFlag {
        GapFlag::DATA_RESIDENCY
    }

    fn evaluate(&self, text: &str) -> bool {
        self.indicators
            .iter()
            .any(|indicator| text.contains(indicator.as_str()))
    }
}

/// Raises its flag when a phrase is absent, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct RequiredPhraseRule {
    flag: GapFlag,
    phrase: String,
}

impl RequiredPhraseRule {
    pub fn new(flag: GapFlag, phrase: &str) -> Self {
        Self {
            flag,
            phrase: phrase.to_lowercase(),
        }
    }

    pub fn compliance_officer() -> Self {
        Self::new(GapFlag::MISSING_COMPLIANCE_OFFICER, COMPLIANCE_OFFICER_PHRASE)
    }
}

impl GapRule for RequiredPhraseRule {
    fn flag(&self) -> GapFlag {
        self.flag.clone()
    }

    fn evaluate(&self, text: &str) -> bool {
        !text.to_lowercase().contains(&self.phrase)
    }
}

/// How the capital-figure heuristic reads a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalPolicy {
    /// A mention of the required figure is flagged so a reviewer can verify it.
    #[default]
    FlagForReview,
    /// A mention of the required figure satisfies the requirement; absence is flagged.
    PresenceImpliesMet,
}

impl CapitalPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "flag_for_review" | "review" => Some(Self::FlagForReview),
            "presence_implies_met" | "met" => Some(Self::PresenceImpliesMet),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FlagForReview => "flag_for_review",
            Self::PresenceImpliesMet => "presence_implies_met",
        }
    }
}

/// Looks for a currency amount equal to the required capital figure.
///
/// The amount may carry thousands separators and the currency code may sit on
/// either side of it, e.g. `QAR 5,000,000` or `5000000 qar`. A larger figure that
/// merely starts with the same digits, such as `QAR 5,000,000,000`, does not count.
#[derive(Debug, Clone)]
pub struct CapitalFigureRule {
    pattern: Regex,
    policy: CapitalPolicy,
}

impl CapitalFigureRule {
    pub fn new(currency: &str, amount: u64, policy: CapitalPolicy) -> Result<Self, regex::Error> {
        let currency = regex::escape(currency.trim());
        let amount = amount_pattern(amount);
        // A separator comma may end a sentence but must not open another digit group.
        let source = format!(
            r"\b{currency}\s*{amount}(?:$|[^\w,]|,(?:$|\D))|\b{amount}\s*{currency}\b"
        );

        let pattern = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self { pattern, policy })
    }

    pub fn policy(&self) -> CapitalPolicy {
        self.policy
    }

    pub fn mentions_figure(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl GapRule for CapitalFigureRule {
    fn flag(&self) -> GapFlag {
        GapFlag::CAPITAL_DEFICIENCY
    }

    fn evaluate(&self, text: &str) -> bool {
        let mentioned = self.mentions_figure(text);
        match self.policy {
            CapitalPolicy::FlagForReview => mentioned,
            CapitalPolicy::PresenceImpliesMet => !mentioned,
        }
    }
}

/// `5000000` -> `5,?000,?000`
fn amount_pattern(amount: u64) -> String {
    let digits = amount.to_string();
    let lead = digits.len() % 3;

    let mut groups: Vec<&str> = Vec::new();
    if lead > 0 {
        groups.push(&digits[..lead]);
    }
    let mut index = lead;
    while index < digits.len() {
        groups.push(&digits[index..index + 3]);
        index += 3;
    }

    groups.join(",?")
}

/// Tunables for the bundled gap rules.
#[derive(Debug, Clone, PartialEq)]
pub struct GapSettings {
    pub residency_indicators: Vec<String>,
    pub capital_policy: CapitalPolicy,
    pub required_capital: u64,
    pub capital_currency: String,
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            residency_indicators: DEFAULT_RESIDENCY_INDICATORS
                .iter()
                .map(|indicator| indicator.to_string())
                .collect(),
            capital_policy: CapitalPolicy::default(),
            required_capital: DEFAULT_REQUIRED_CAPITAL,
            capital_currency: DEFAULT_CAPITAL_CURRENCY.to_string(),
        }
    }
}

/// Ordered set of gap rules, each evaluated independently.
#[derive(Default)]
pub struct GapDetector {
    rules: Vec<Box<dyn GapRule>>,
}

impl GapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Residency, compliance-officer and capital rules with default settings.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::from_settings(&GapSettings::default())
    }

    pub fn from_settings(settings: &GapSettings) -> Result<Self, regex::Error> {
        let capital = CapitalFigureRule::new(
            &settings.capital_currency,
            settings.required_capital,
            settings.capital_policy,
        )?;

        Ok(Self::new()
            .with_rule(ResidencyIndicatorRule::new(
                settings.residency_indicators.iter().cloned(),
            ))
            .with_rule(RequiredPhraseRule::compliance_officer())
            .with_rule(capital))
    }

    pub fn with_rule(mut self, rule: impl GapRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Flags raised by the registered rules, in registration order without repeats.
    pub fn detect_gaps(&self, text: &str) -> Vec<GapFlag> {
        let mut flags: Vec<GapFlag> = Vec::new();
        for rule in &self.rules {
            if rule.evaluate(text) {
                let flag = rule.flag();
                if !flags.contains(&flag) {
                    flags.push(flag);
                }
            }
        }
        flags
    }
}

impl fmt::Debug for GapDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<GapFlag> = self.rules.iter().map(|rule| rule.flag()).collect();
        f.debug_struct("GapDetector").field("rules", &flags).finish()
    }
}

#[cfg(test)]
pub(crate) fn amount_pattern_for_tests(amount: u64) -> String {
    amount_pattern(amount)
}
