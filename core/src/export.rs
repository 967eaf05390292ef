//! Export: allocation rows -> flat CSV table.

use crate::{
    error::PortfolioResult,
    record::AllocationRow,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column layout of the output table.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "Investor_ID")]
    investor_id: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Risk_Profile")]
    risk_profile: &'static str,
    #[serde(rename = "Asset_Class")]
    asset_class: &'a str,
    #[serde(rename = "Allocation_%")]
    allocation_pct: f64,
    #[serde(rename = "Investment_Amount")]
    investment_amount: Option<f64>,
    #[serde(rename = "Expected_Return_%")]
    expected_return_pct: f64,
    #[serde(rename = "Expected_Profit")]
    expected_profit: Option<f64>,
    #[serde(rename = "Investment_Date")]
    investment_date: String,
}

impl<'a> From<&'a AllocationRow> for OutputRow<'a> {
    fn from(row: &'a AllocationRow) -> Self {
        Self {
            investor_id:         &row.investor_id,
            name:                &row.name,
            risk_profile:        row.risk_profile.as_str(),
            asset_class:         &row.asset_class,
            allocation_pct:      row.allocation_pct,
            investment_amount:   row.investment_amount,
            expected_return_pct: row.expected_return_pct,
            expected_profit:     row.expected_profit,
            investment_date:     row.investment_date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Streams rows to a CSV sink. The header is written with the first row.
pub struct PortfolioWriter<W: Write> {
    inner: csv::Writer<W>,
    rows:  usize,
}

impl<W: Write> PortfolioWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            inner: csv::Writer::from_writer(sink),
            rows:  0,
        }
    }

    pub fn write_row(&mut self, row: &AllocationRow) -> PortfolioResult<()> {
        self.inner.serialize(OutputRow::from(row))?;
        self.rows += 1;
        Ok(())
    }

    pub fn finish(mut self) -> PortfolioResult<usize> {
        self.inner.flush()?;
        Ok(self.rows)
    }
}

impl PortfolioWriter<std::fs::File> {
    pub fn create(path: impl AsRef<Path>) -> PortfolioResult<Self> {
        let file = std::fs::File::create(path.as_ref())?;
        Ok(Self::new(file))
    }
}
