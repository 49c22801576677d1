//! Monthly GST aggregation over saved invoices

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::format::format_percent;
use crate::tax::gst::{LineComputation, SupplyType, TaxSplit};
use crate::types::{BillingError, BillingResult, Invoice, InvoiceStatus};

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub year: i32,
    /// 1 = January
    pub month: u32,
}

impl ReportPeriod {
    pub fn new(year: i32, month: u32) -> BillingResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(BillingError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Compares the date-only value, day ignored
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Report reference code, e.g. `#GST-2024-3`
    pub fn reference_code(&self) -> String {
        format!("#GST-{}-{}", self.year, self.month)
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Invoices dated inside the period, in their original order
pub fn invoices_in_period(invoices: &[Invoice], period: ReportPeriod) -> Vec<&Invoice> {
    invoices
        .iter()
        .filter(|invoice| period.contains(invoice.date))
        .collect()
}

/// Month-over-month change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Growth {
    /// Neither month has anything to compare
    NoPriorData,
    /// Nothing last month, something this month; reported as +100%
    FromZero,
    /// Percentage change against the previous month
    Change(BigDecimal),
}

impl Growth {
    /// `(current − previous) / previous × 100`.
    ///
    /// A zero previous month reports +100% when the current month is
    /// positive and no prior data otherwise.
    pub fn between(current: &BigDecimal, previous: &BigDecimal) -> Self {
        if previous.is_zero() {
            if current > &BigDecimal::from(0) {
                Growth::FromZero
            } else {
                Growth::NoPriorData
            }
        } else {
            Growth::Change((current - previous) / previous * BigDecimal::from(100))
        }
    }

    pub fn percent(&self) -> Option<BigDecimal> {
        match self {
            Growth::NoPriorData => None,
            Growth::FromZero => Some(BigDecimal::from(100)),
            Growth::Change(percent) => Some(percent.clone()),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.percent()
            .is_some_and(|percent| percent >= BigDecimal::from(0))
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::NoPriorData => write!(f, "No data for last month"),
            Growth::FromZero => write!(f, "+100% vs last month"),
            Growth::Change(percent) => {
                let sign = if percent >= &BigDecimal::from(0) { "+" } else { "" };
                write!(
                    f,
                    "{}{}% vs last month",
                    sign,
                    percent.with_scale_round(1, RoundingMode::HalfUp)
                )
            }
        }
    }
}

/// Sales category of a breakdown row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BreakdownCategory {
    Interstate,
    Local(BigDecimal),
}

impl BreakdownCategory {
    pub fn description(&self) -> String {
        match self {
            BreakdownCategory::Interstate => "Interstate Sales".to_string(),
            BreakdownCategory::Local(rate) => format!("Local Sales ({})", format_percent(rate)),
        }
    }
}

/// One row of the liability breakdown table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub category: BreakdownCategory,
    pub line_count: usize,
    pub taxable_value: BigDecimal,
    pub split: TaxSplit,
    pub total: BigDecimal,
}

impl BreakdownRow {
    fn new(category: BreakdownCategory) -> Self {
        Self {
            category,
            line_count: 0,
            taxable_value: BigDecimal::from(0),
            split: TaxSplit::default(),
            total: BigDecimal::from(0),
        }
    }

    fn add(&mut self, line: &LineComputation) {
        self.line_count += 1;
        self.taxable_value += &line.taxable_value;
        self.split.add(&line.split);
        self.total += &line.line_tax;
    }

    pub fn description(&self) -> String {
        self.category.description()
    }
}

/// GST liability for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGstSummary {
    pub period: ReportPeriod,
    pub invoice_count: usize,
    /// Σ grand total
    pub total_sales: BigDecimal,
    /// Σ tax total, the output GST
    pub total_tax: BigDecimal,
    pub split: TaxSplit,
    pub breakdown: Vec<BreakdownRow>,
    pub previous_tax: BigDecimal,
    pub growth: Growth,
}

impl MonthlyGstSummary {
    /// Aggregate all invoices of `period`, comparing against the month before
    pub fn build(invoices: &[Invoice], period: ReportPeriod) -> Self {
        let current = invoices_in_period(invoices, period);
        let previous = invoices_in_period(invoices, period.previous());

        let total_sales: BigDecimal = current.iter().map(|invoice| &invoice.grand_total).sum();
        let total_tax: BigDecimal = current.iter().map(|invoice| &invoice.tax_total).sum();
        let previous_tax: BigDecimal = previous.iter().map(|invoice| &invoice.tax_total).sum();

        let mut interstate = BreakdownRow::new(BreakdownCategory::Interstate);
        let mut local: BTreeMap<BigDecimal, BreakdownRow> = BTreeMap::new();
        let mut split = TaxSplit::default();

        for invoice in &current {
            let supply = SupplyType::from_interstate_flag(invoice.is_interstate);
            for item in &invoice.items {
                let line = LineComputation::for_item(item, supply);
                split.add(&line.split);
                match supply {
                    SupplyType::InterState => interstate.add(&line),
                    SupplyType::IntraState => {
                        let rate = item.gst_rate.clone();
                        local
                            .entry(rate.clone())
                            .or_insert_with(|| BreakdownRow::new(BreakdownCategory::Local(rate)))
                            .add(&line);
                    }
                }
            }
        }

        let mut breakdown = Vec::with_capacity(local.len() + 1);
        if interstate.line_count > 0 {
            breakdown.push(interstate);
        }
        breakdown.extend(local.into_values());

        let growth = Growth::between(&total_tax, &previous_tax);

        Self {
            period,
            invoice_count: current.len(),
            total_sales,
            total_tax,
            split,
            breakdown,
            previous_tax,
            growth,
        }
    }

    /// Input tax credit is not tracked
    pub fn input_tax_credit(&self) -> BigDecimal {
        BigDecimal::from(0)
    }

    pub fn net_payable(&self) -> BigDecimal {
        &self.total_tax - self.input_tax_credit()
    }
}

/// Headline figures for the home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub period: ReportPeriod,
    pub invoice_count: usize,
    pub total_sales: BigDecimal,
    pub pending_amount: BigDecimal,
    pub pending_count: usize,
    pub overdue_amount: BigDecimal,
    pub sales_growth: Growth,
}

impl DashboardStats {
    pub fn build(invoices: &[Invoice], period: ReportPeriod) -> Self {
        let current = invoices_in_period(invoices, period);
        let previous_sales: BigDecimal = invoices_in_period(invoices, period.previous())
            .iter()
            .map(|invoice| &invoice.grand_total)
            .sum();

        let total_sales: BigDecimal = current.iter().map(|invoice| &invoice.grand_total).sum();

        let pending: Vec<&Invoice> = current
            .iter()
            .copied()
            .filter(|invoice| invoice.status == InvoiceStatus::Pending)
            .collect();
        let pending_amount: BigDecimal = pending.iter().map(|invoice| &invoice.grand_total).sum();
        let overdue_amount: BigDecimal = current
            .iter()
            .filter(|invoice| invoice.status == InvoiceStatus::Overdue)
            .map(|invoice| &invoice.grand_total)
            .sum();

        Self {
            period,
            invoice_count: current.len(),
            sales_growth: Growth::between(&total_sales, &previous_sales),
            total_sales,
            pending_amount,
            pending_count: pending.len(),
            overdue_amount,
        }
    }
}
