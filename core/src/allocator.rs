//! Allocator: one classified respondent -> one row per asset class.
//!
//! RULES:
//!   - Rows follow the allocation rule's asset order, never re-sorted.
//!   - A rule with N weights yields exactly N rows.
//!   - Expected profit is computed from the unrounded allocated amount;
//!     only the final figures are rounded (ties to even).
//!   - Market returns are resolved once in `new()`. A rule naming an asset
//!     with no market assumption fails there, before any record is seen.

use crate::{
    classifier::RiskProfile,
    config::PortfolioConfig,
    error::{PortfolioError, PortfolioResult},
    record::{AllocationRow, ClassifiedRecord},
    types::{round_whole, AssetClass},
};
use std::collections::HashMap;

/// An allocation weight joined with its market assumption.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeight {
    pub asset_class:     AssetClass,
    pub fraction:        f64,
    pub expected_return: f64,
}

pub struct Allocator {
    rules: HashMap<RiskProfile, Vec<ResolvedWeight>>,
}

impl Allocator {
    /// Validate the static tables and join each rule with market returns.
    pub fn new(config: &PortfolioConfig) -> PortfolioResult<Self> {
        config.validate()?;

        let mut rules = HashMap::with_capacity(config.allocation_rules.len());
        for rule in &config.allocation_rules {
            let mut resolved = Vec::with_capacity(rule.weights.len());
            for weight in &rule.weights {
                let market = config.market_assumption(&weight.asset_class).ok_or_else(|| {
                    PortfolioError::MarketDataInconsistency {
                        risk_profile: rule.risk_profile,
                        asset_class:  weight.asset_class.clone(),
                    }
                })?;
                resolved.push(ResolvedWeight {
                    asset_class:     weight.asset_class.clone(),
                    fraction:        weight.fraction,
                    expected_return: market.expected_return,
                });
            }
            rules.insert(rule.risk_profile, resolved);
        }

        Ok(Self { rules })
    }

    pub fn weights_for(&self, profile: RiskProfile) -> Option<&[ResolvedWeight]> {
        self.rules.get(&profile).map(Vec::as_slice)
    }

    /// Expand `record` into its allocation rows.
    ///
    /// Fails with `MissingRule` when the record's risk profile is `None` or
    /// has no rule. The returned iterator is lazy and can be cloned to
    /// replay the same rows.
    pub fn allocate<'a>(&'a self, record: &'a ClassifiedRecord) -> PortfolioResult<Allocations<'a>> {
        let missing = || PortfolioError::MissingRule {
            investor_id:  record.investor_id().to_string(),
            risk_profile: record.risk_profile,
        };
        let profile = record.risk_profile.ok_or_else(missing)?;
        let weights = self.weights_for(profile).ok_or_else(missing)?;

        log::debug!(
            "{}: allocating {:?} across {} assets ({profile})",
            record.investor_id(),
            record.investment_amount,
            weights.len()
        );

        Ok(Allocations {
            record,
            profile,
            weights: weights.iter(),
        })
    }
}

/// Lazy sequence of one respondent's allocation rows.
#[derive(Clone)]
pub struct Allocations<'a> {
    record:  &'a ClassifiedRecord,
    profile: RiskProfile,
    weights: std::slice::Iter<'a, ResolvedWeight>,
}

impl Allocations<'_> {
    fn row(&self, weight: &ResolvedWeight) -> AllocationRow {
        let respondent = &self.record.respondent;
        let allocated = self.record.investment_amount.map(|amount| amount * weight.fraction);

        AllocationRow {
            investor_id:         respondent.investor_id.clone(),
            name:                respondent.name.clone(),
            risk_profile:        self.profile,
            asset_class:         weight.asset_class.clone(),
            allocation_pct:      weight.fraction * 100.0,
            investment_amount:   allocated.map(round_whole),
            expected_return_pct: weight.expected_return * 100.0,
            expected_profit:     allocated.map(|a| round_whole(a * weight.expected_return)),
            investment_date:     respondent.timestamp,
        }
    }
}

impl Iterator for Allocations<'_> {
    type Item = AllocationRow;

    fn next(&mut self) -> Option<AllocationRow> {
        let weight = self.weights.next()?;
        Some(self.row(weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.weights.size_hint()
    }
}

impl ExactSizeIterator for Allocations<'_> {}
