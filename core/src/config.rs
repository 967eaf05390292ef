//! Static lookup tables and cleaning settings.
//!
//! Nothing in here is process-wide state: a `PortfolioConfig` is built once
//! per run (from `data/` or `reference()`) and handed to the classifier,
//! allocator and ingest stages by reference.

use crate::{
    classifier::RiskProfile,
    error::{PortfolioError, PortfolioResult},
    types::AssetClass,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance for an allocation rule's fractions summing to 1.0.
pub const RULE_SUM_TOLERANCE: f64 = 1e-9;

pub const CONFIG_FILE: &str = "portfolio_config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeBucket {
    pub label:  String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskStatement {
    pub statement:    String,
    pub risk_profile: RiskProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetWeight {
    pub asset_class: AssetClass,
    pub fraction:    f64,
}

/// Percentage split for one risk profile. `weights` order is the row order
/// of every respondent block produced for this profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRule {
    pub risk_profile: RiskProfile,
    pub weights:      Vec<AssetWeight>,
}

impl AllocationRule {
    pub fn fraction_sum(&self) -> f64 {
        self.weights.iter().map(|w| w.fraction).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketAssumption {
    pub asset_class:     AssetClass,
    pub expected_return: f64,
    /// Informational only; never read by the allocator.
    pub risk_level:      String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextReplacement {
    pub from: String,
    pub to:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnRename {
    pub from: String,
    pub to:   String,
}

/// Settings for the ingest stage's cell and header repair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleaningConfig {
    /// Applied to every cell, in order.
    pub replacements:   Vec<TextReplacement>,
    /// Applied to headers after whitespace cleanup.
    pub column_renames: Vec<ColumnRename>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        let replacement = |from: &str, to: &str| TextReplacement {
            from: from.into(),
            to:   to.into(),
        };
        let rename = |from: &str, to: &str| ColumnRename {
            from: from.into(),
            to:   to.into(),
        };
        Self {
            // UTF-8 bytes of '₹' and '–' read back as Windows-1252.
            replacements: vec![
                replacement("â‚¹", "₹"),
                replacement("â€“", "–"),
            ],
            column_renames: vec![
                rename("How much amount are you willing to invest?", "Investment_Range"),
                rename(
                    "How do you feel if your investment value fluctuates in the short term?",
                    "Risk_Tolerance",
                ),
                rename("What is your primary investment goal?", "Investment_Goal"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioConfig {
    pub investment_ranges:  Vec<RangeBucket>,
    pub risk_statements:    Vec<RiskStatement>,
    pub allocation_rules:   Vec<AllocationRule>,
    pub market_assumptions: Vec<MarketAssumption>,
    #[serde(default)]
    pub cleaning:           CleaningConfig,
}

impl PortfolioConfig {
    /// Load from `{data_dir}/portfolio_config.json`.
    /// In tests, use PortfolioConfig::reference().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::debug!(
            "Loaded {path}: {} ranges, {} statements, {} rules, {} assets",
            config.investment_ranges.len(),
            config.risk_statements.len(),
            config.allocation_rules.len(),
            config.market_assumptions.len()
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> PortfolioResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn rule_for(&self, profile: RiskProfile) -> Option<&AllocationRule> {
        self.allocation_rules
            .iter()
            .find(|r| r.risk_profile == profile)
    }

    pub fn market_assumption(&self, asset_class: &str) -> Option<&MarketAssumption> {
        self.market_assumptions
            .iter()
            .find(|m| m.asset_class == asset_class)
    }

    /// Startup consistency check. Run before any record is read.
    ///
    /// - every table key is unique (range label, statement, risk profile,
    ///   market asset class)
    /// - every rule's fractions sum to 1.0 (within RULE_SUM_TOLERANCE)
    /// - every asset class a rule names has a market assumption
    pub fn validate(&self) -> PortfolioResult<()> {
        unique_keys("investment range", self.investment_ranges.iter().map(|r| r.label.as_str()))?;
        unique_keys("risk statement", self.risk_statements.iter().map(|s| s.statement.as_str()))?;
        unique_keys("allocation rule", self.allocation_rules.iter().map(|r| r.risk_profile.as_str()))?;
        unique_keys("market assumption", self.market_assumptions.iter().map(|m| m.asset_class.as_str()))?;

        for rule in &self.allocation_rules {
            let sum = rule.fraction_sum();
            if !sum.is_finite() || (sum - 1.0).abs() > RULE_SUM_TOLERANCE {
                return Err(PortfolioError::AllocationRuleSum {
                    risk_profile: rule.risk_profile,
                    sum,
                });
            }
            for weight in &rule.weights {
                if self.market_assumption(&weight.asset_class).is_none() {
                    return Err(PortfolioError::MarketDataInconsistency {
                        risk_profile: rule.risk_profile,
                        asset_class:  weight.asset_class.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The survey tables the pipeline ships with.
    pub fn reference() -> Self {
        let range = |label: &str, amount: f64| RangeBucket {
            label: label.into(),
            amount,
        };
        let statement = |statement: &str, risk_profile| RiskStatement {
            statement: statement.into(),
            risk_profile,
        };
        let rule = |risk_profile, equity: f64, bonds: f64, gold: f64| AllocationRule {
            risk_profile,
            weights: vec![
                AssetWeight { asset_class: "Equity".into(),     fraction: equity },
                AssetWeight { asset_class: "Govt Bonds".into(), fraction: bonds },
                AssetWeight { asset_class: "Gold".into(),       fraction: gold },
            ],
        };
        let market = |asset_class: &str, expected_return: f64, risk_level: &str| MarketAssumption {
            asset_class: asset_class.into(),
            expected_return,
            risk_level: risk_level.into(),
        };

        Self {
            investment_ranges: vec![
                range("₹1,00,000 – ₹3,00,000", 200_000.0),
                range("₹3,00,001 – ₹6,00,000", 450_000.0),
                range("₹6,00,001 – ₹10,00,000", 800_000.0),
                range("Above ₹10,00,000", 1_200_000.0),
            ],
            risk_statements: vec![
                statement("I prefer stable returns even if growth is low", RiskProfile::Low),
                statement("I can tolerate moderate ups and downs", RiskProfile::Medium),
                statement(
                    "I am comfortable with high fluctuations for higher returns",
                    RiskProfile::High,
                ),
            ],
            allocation_rules: vec![
                rule(RiskProfile::Low,    0.2, 0.6, 0.2),
                rule(RiskProfile::Medium, 0.4, 0.4, 0.2),
                rule(RiskProfile::High,   0.6, 0.2, 0.2),
            ],
            market_assumptions: vec![
                market("Equity",     0.12, "High"),
                market("Govt Bonds", 0.07, "Low"),
                market("Gold",       0.06, "Low"),
            ],
            cleaning: CleaningConfig::default(),
        }
    }
}

fn unique_keys<'a>(table: &'static str, keys: impl IntoIterator<Item = &'a str>) -> PortfolioResult<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(PortfolioError::DuplicateKey {
                table,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_is_consistent() {
        PortfolioConfig::reference().validate().unwrap();
    }

    #[test]
    fn every_reference_rule_sums_to_one() {
        for rule in &PortfolioConfig::reference().allocation_rules {
            let sum = rule.fraction_sum();
            assert!(
                (sum - 1.0).abs() <= RULE_SUM_TOLERANCE,
                "{} sums to {sum}",
                rule.risk_profile
            );
        }
    }

    #[test]
    fn rule_not_summing_to_one_is_rejected() {
        let mut config = PortfolioConfig::reference();
        config.allocation_rules[2].weights[0].fraction = 0.7;

        match config.validate() {
            Err(PortfolioError::AllocationRuleSum { risk_profile, .. }) => {
                assert_eq!(risk_profile, RiskProfile::High);
            }
            other => panic!("expected AllocationRuleSum, got {other:?}"),
        }
    }

    #[test]
    fn nan_fraction_is_rejected() {
        let mut config = PortfolioConfig::reference();
        config.allocation_rules[0].weights[1].fraction = f64::NAN;

        assert!(matches!(
            config.validate(),
            Err(PortfolioError::AllocationRuleSum { risk_profile: RiskProfile::Low, .. })
        ));
    }

    #[test]
    fn duplicate_rule_profile_is_rejected() {
        let mut config = PortfolioConfig::reference();
        config.allocation_rules.push(AllocationRule {
            risk_profile: RiskProfile::High,
            weights: vec![AssetWeight { asset_class: "Gold".into(), fraction: 1.0 }],
        });

        match config.validate() {
            Err(PortfolioError::DuplicateKey { table, key }) => {
                assert_eq!(table, "allocation rule");
                assert_eq!(key, "High");
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_range_and_statement_labels_are_rejected() {
        let mut config = PortfolioConfig::reference();
        let mut bucket = config.investment_ranges[0].clone();
        bucket.amount = 1.0;
        config.investment_ranges.push(bucket);
        assert!(matches!(
            config.validate(),
            Err(PortfolioError::DuplicateKey { table: "investment range", .. })
        ));

        let mut config = PortfolioConfig::reference();
        let mut statement = config.risk_statements[0].clone();
        statement.risk_profile = RiskProfile::High;
        config.risk_statements.push(statement);
        assert!(matches!(
            config.validate(),
            Err(PortfolioError::DuplicateKey { table: "risk statement", .. })
        ));
    }

    #[test]
    fn config_json_round_trips_through_serde() {
        let config = PortfolioConfig::reference();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed = PortfolioConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        assert!(matches!(
            PortfolioConfig::from_json("{ \"investment_ranges\": 3 }"),
            Err(PortfolioError::Serialization(_))
        ));
    }

    #[test]
    fn cleaning_defaults_when_section_omitted() {
        let mut value = serde_json::to_value(PortfolioConfig::reference()).unwrap();
        value.as_object_mut().unwrap().remove("cleaning");
        let parsed: PortfolioConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.cleaning, CleaningConfig::default());
    }
}
