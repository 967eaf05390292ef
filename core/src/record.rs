//! Record types flowing through the pipeline.
//!
//!   RespondentRecord  --classify-->  ClassifiedRecord  --allocate-->  AllocationRow x N
//!
//! Records are created once per run and never mutated afterwards.

use crate::{
    classifier::RiskProfile,
    types::{AssetClass, InvestorId},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One cleaned survey response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RespondentRecord {
    /// Positional ID, assigned by ingest from the row's input order.
    pub investor_id:            InvestorId,
    pub name:                   String,
    pub investment_range_label: String,
    pub risk_tolerance_label:   String,
    pub timestamp:              NaiveDateTime,
}

/// Which survey answer failed its lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LabelField {
    InvestmentRange,
    RiskTolerance,
}

/// A survey answer with no entry in its lookup table.
/// Recovered as a `None` field; never aborts the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmappedLabel {
    pub investor_id: InvestorId,
    pub field:       LabelField,
    pub label:       String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedRecord {
    pub respondent:        RespondentRecord,
    /// `None` when the range label is unmapped.
    pub investment_amount: Option<f64>,
    /// `None` when the tolerance statement is unmapped.
    pub risk_profile:      Option<RiskProfile>,
}

impl ClassifiedRecord {
    pub fn investor_id(&self) -> &str {
        &self.respondent.investor_id
    }

    pub fn unmapped_labels(&self) -> Vec<UnmappedLabel> {
        let mut out = Vec::new();
        if self.investment_amount.is_none() {
            out.push(UnmappedLabel {
                investor_id: self.respondent.investor_id.clone(),
                field:       LabelField::InvestmentRange,
                label:       self.respondent.investment_range_label.clone(),
            });
        }
        if self.risk_profile.is_none() {
            out.push(UnmappedLabel {
                investor_id: self.respondent.investor_id.clone(),
                field:       LabelField::RiskTolerance,
                label:       self.respondent.risk_tolerance_label.clone(),
            });
        }
        out
    }
}

/// One (respondent, asset class) row of the final table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRow {
    pub investor_id:         InvestorId,
    pub name:                String,
    pub risk_profile:        RiskProfile,
    pub asset_class:         AssetClass,
    pub allocation_pct:      f64,
    /// Rounded to whole units; `None` propagates an unmapped range label.
    pub investment_amount:   Option<f64>,
    pub expected_return_pct: f64,
    /// Rounded from the unrounded allocated amount.
    pub expected_profit:     Option<f64>,
    pub investment_date:     NaiveDateTime,
}
