//! Classifier: survey answers -> investment amount + risk profile.
//!
//! Two independent exact-match lookups. No fuzzy matching and no
//! normalization beyond what ingest already applied.

use crate::{
    config::PortfolioConfig,
    record::{ClassifiedRecord, RespondentRecord},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskProfile {
    Low,
    Medium,
    High,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [RiskProfile::Low, RiskProfile::Medium, RiskProfile::High];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskProfile::Low    => "Low",
            RiskProfile::Medium => "Medium",
            RiskProfile::High   => "High",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of looking a survey answer up in one of the label tables.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelLookup<T> {
    Mapped(T),
    Unmapped(String),
}

impl<T> LabelLookup<T> {
    pub fn mapped(self) -> Option<T> {
        match self {
            LabelLookup::Mapped(v)   => Some(v),
            LabelLookup::Unmapped(_) => None,
        }
    }
}

pub struct Classifier {
    amounts:  HashMap<String, f64>,
    profiles: HashMap<String, RiskProfile>,
}

impl Classifier {
    pub fn new(config: &PortfolioConfig) -> Self {
        Self {
            amounts: config
                .investment_ranges
                .iter()
                .map(|r| (r.label.clone(), r.amount))
                .collect(),
            profiles: config
                .risk_statements
                .iter()
                .map(|s| (s.statement.clone(), s.risk_profile))
                .collect(),
        }
    }

    pub fn lookup_amount(&self, label: &str) -> LabelLookup<f64> {
        match self.amounts.get(label) {
            Some(amount) => LabelLookup::Mapped(*amount),
            None         => LabelLookup::Unmapped(label.to_string()),
        }
    }

    pub fn lookup_profile(&self, statement: &str) -> LabelLookup<RiskProfile> {
        match self.profiles.get(statement) {
            Some(profile) => LabelLookup::Mapped(*profile),
            None          => LabelLookup::Unmapped(statement.to_string()),
        }
    }

    /// Enrich one respondent. A lookup miss leaves the field `None`.
    pub fn classify(&self, respondent: RespondentRecord) -> ClassifiedRecord {
        let amount = self.lookup_amount(&respondent.investment_range_label);
        let profile = self.lookup_profile(&respondent.risk_tolerance_label);

        if let LabelLookup::Unmapped(label) = &amount {
            log::warn!("{}: unmapped investment range '{label}'", respondent.investor_id);
        }
        if let LabelLookup::Unmapped(label) = &profile {
            log::warn!("{}: unmapped risk tolerance '{label}'", respondent.investor_id);
        }

        ClassifiedRecord {
            investment_amount: amount.mapped(),
            risk_profile:      profile.mapped(),
            respondent,
        }
    }
}
