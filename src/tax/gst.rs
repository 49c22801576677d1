//! GST (Goods and Services Tax) calculation engine for invoice lines and totals

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};

use crate::types::{Customer, Factory, Invoice, InvoiceItem};

/// Fractional digits kept when a tax-inclusive rate is split back into its base.
pub const INTERNAL_SCALE: i64 = 10;

/// Whether a supply stays inside one state or crosses a state border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyType {
    /// Seller and buyer in the same state: CGST + SGST
    #[default]
    IntraState,
    /// Different states: IGST
    InterState,
}

impl SupplyType {
    /// Decide from two state codes. Unknown on either side counts as local.
    pub fn between(seller_state: Option<&str>, buyer_state: Option<&str>) -> Self {
        match (seller_state, buyer_state) {
            (Some(seller), Some(buyer)) if seller != buyer => SupplyType::InterState,
            _ => SupplyType::IntraState,
        }
    }

    pub fn for_parties(factory: Option<&Factory>, customer: Option<&Customer>) -> Self {
        let seller = factory.and_then(Factory::state_code);
        let buyer = customer.and_then(Customer::state_code);
        Self::between(seller.as_deref(), buyer.as_deref())
    }

    pub fn from_interstate_flag(is_interstate: bool) -> Self {
        if is_interstate {
            SupplyType::InterState
        } else {
            SupplyType::IntraState
        }
    }

    pub fn is_interstate(&self) -> bool {
        matches!(self, SupplyType::InterState)
    }
}

/// GST slabs a product or line may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GstCategory {
    /// Exempt / nil rated - 0%
    Exempt,
    /// Reduced rate items - 5%
    Reduced,
    /// Standard rate items - 12%
    Standard,
    /// Higher rate items - 18%
    Higher,
    /// Luxury/Sin goods - 28%
    Luxury,
    /// Special rate slot - 40%
    Special,
}

impl GstCategory {
    pub const ALL: [GstCategory; 6] = [
        GstCategory::Exempt,
        GstCategory::Reduced,
        GstCategory::Standard,
        GstCategory::Higher,
        GstCategory::Luxury,
        GstCategory::Special,
    ];

    /// Get the standard GST rate for this category
    pub fn rate(&self) -> BigDecimal {
        BigDecimal::from(self.percent())
    }

    pub fn percent(&self) -> u32 {
        match self {
            GstCategory::Exempt => 0,
            GstCategory::Reduced => 5,
            GstCategory::Standard => 12,
            GstCategory::Higher => 18,
            GstCategory::Luxury => 28,
            GstCategory::Special => 40,
        }
    }

    /// Look up the slab for a percentage, if it is one of the fixed rates
    pub fn from_rate(rate: &BigDecimal) -> Option<Self> {
        Self::ALL.into_iter().find(|category| &category.rate() == rate)
    }

    /// Slabs offered for selection
    pub fn available(allow_special: bool) -> Vec<GstCategory> {
        Self::ALL
            .into_iter()
            .filter(|category| allow_special || *category != GstCategory::Special)
            .collect()
    }
}

/// Check a percentage against the fixed slabs
pub fn validate_gst_rate(rate: &BigDecimal, allow_special: bool) -> Result<GstCategory, GstError> {
    match GstCategory::from_rate(rate) {
        Some(GstCategory::Special) if !allow_special => Err(GstError::InvalidRate(
            "The 40% special rate is disabled".to_string(),
        )),
        Some(category) => Ok(category),
        None => Err(GstError::InvalidRate(format!(
            "{}% is not a GST slab (expected one of 0, 5, 12, 18, 28{})",
            crate::format::plain_decimal(rate),
            if allow_special { ", 40" } else { "" }
        ))),
    }
}

/// CGST / SGST / IGST components of a tax amount
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxSplit {
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
}

impl TaxSplit {
    /// Halve local tax into CGST and SGST, or carry it whole as IGST
    pub fn of(tax: &BigDecimal, supply: SupplyType) -> Self {
        match supply {
            SupplyType::IntraState => {
                let cgst = tax / BigDecimal::from(2);
                let sgst = tax - &cgst;
                Self {
                    cgst,
                    sgst,
                    igst: BigDecimal::from(0),
                }
            }
            SupplyType::InterState => Self {
                cgst: BigDecimal::from(0),
                sgst: BigDecimal::from(0),
                igst: tax.clone(),
            },
        }
    }

    pub fn total(&self) -> BigDecimal {
        &self.cgst + &self.sgst + &self.igst
    }

    pub fn add(&mut self, other: &TaxSplit) {
        self.cgst += &other.cgst;
        self.sgst += &other.sgst;
        self.igst += &other.igst;
    }
}

/// Per-line GST calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineComputation {
    pub quantity: BigDecimal,
    /// Nominal unit rate as billed
    pub rate: BigDecimal,
    pub gst_rate: BigDecimal,
    pub is_inclusive: bool,
    /// Pre-tax unit rate
    pub base_rate: BigDecimal,
    /// quantity × base rate
    pub taxable_value: BigDecimal,
    pub line_tax: BigDecimal,
    pub line_total: BigDecimal,
    pub split: TaxSplit,
}

impl LineComputation {
    /// Calculate the tax of a single line.
    ///
    /// Exclusive pricing adds tax on top of `rate`; inclusive pricing carves
    /// it out, so the line total stays `quantity × rate`. A zero rate never
    /// produces tax.
    pub fn calculate(
        quantity: &BigDecimal,
        rate: &BigDecimal,
        gst_rate: &BigDecimal,
        is_inclusive: bool,
        supply: SupplyType,
    ) -> Self {
        let gross = quantity * rate;

        let (base_rate, taxable_value, line_tax, line_total) = if gst_rate.is_zero() {
            (rate.clone(), gross.clone(), BigDecimal::from(0), gross)
        } else if is_inclusive && *gst_rate > BigDecimal::from(-100) {
            let divisor = BigDecimal::from(1) + gst_rate / BigDecimal::from(100);
            let base_rate =
                (rate / divisor).with_scale_round(INTERNAL_SCALE, RoundingMode::HalfEven);
            let taxable_value = quantity * &base_rate;
            let line_tax = &gross - &taxable_value;
            (base_rate, taxable_value, line_tax, gross)
        } else {
            let line_tax = &gross * gst_rate / BigDecimal::from(100);
            let line_total = &gross + &line_tax;
            (rate.clone(), gross, line_tax, line_total)
        };

        let split = TaxSplit::of(&line_tax, supply);

        Self {
            quantity: quantity.clone(),
            rate: rate.clone(),
            gst_rate: gst_rate.clone(),
            is_inclusive,
            base_rate,
            taxable_value,
            line_tax,
            line_total,
            split,
        }
    }

    pub fn for_item(item: &InvoiceItem, supply: SupplyType) -> Self {
        Self::calculate(
            &item.quantity,
            &item.rate,
            &item.gst_rate,
            item.is_inclusive(),
            supply,
        )
    }
}

/// Complete invoice calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub supply: SupplyType,
    pub lines: Vec<LineComputation>,
    /// Σ quantity × base rate, before tax and discount
    pub sub_total: BigDecimal,
    pub tax_total: BigDecimal,
    pub split: TaxSplit,
    /// Flat amount taken off once from subtotal + tax
    pub discount: BigDecimal,
    pub grand_total: BigDecimal,
}

impl InvoiceTotals {
    pub fn calculate(items: &[InvoiceItem], discount: &BigDecimal, supply: SupplyType) -> Self {
        let lines: Vec<LineComputation> = items
            .iter()
            .map(|item| LineComputation::for_item(item, supply))
            .collect();

        let sub_total: BigDecimal = lines.iter().map(|line| &line.taxable_value).sum();
        let tax_total: BigDecimal = lines.iter().map(|line| &line.line_tax).sum();

        let mut split = TaxSplit::default();
        for line in &lines {
            split.add(&line.split);
        }

        let grand_total = &sub_total + &tax_total - discount;

        Self {
            supply,
            lines,
            sub_total,
            tax_total,
            split,
            discount: discount.clone(),
            grand_total,
        }
    }

    /// Recalculate from the stored lines and discount of an invoice
    pub fn for_invoice(invoice: &Invoice) -> Self {
        Self::calculate(
            &invoice.items,
            &invoice.discount,
            SupplyType::from_interstate_flag(invoice.is_interstate),
        )
    }

    /// Same lines with a different discount. Only the grand total moves.
    pub fn with_discount(&self, discount: &BigDecimal) -> Self {
        let mut totals = self.clone();
        totals.discount = discount.clone();
        totals.grand_total = &totals.sub_total + &totals.tax_total - discount;
        totals
    }

    /// Subtotal less discount
    pub fn taxable_value(&self) -> BigDecimal {
        if self.discount > BigDecimal::from(0) {
            &self.sub_total - &self.discount
        } else {
            self.sub_total.clone()
        }
    }

    /// Write the derived values onto an invoice and its items
    pub fn apply_to(&self, invoice: &mut Invoice) {
        for (item, line) in invoice.items.iter_mut().zip(&self.lines) {
            item.tax_amount = line.line_tax.clone();
            item.total = line.line_total.clone();
        }
        invoice.sub_total = self.sub_total.clone();
        invoice.tax_total = self.tax_total.clone();
        invoice.discount = self.discount.clone();
        invoice.grand_total = self.grand_total.clone();
        invoice.is_interstate = self.supply.is_interstate();
    }

    /// Whether the stored totals of an invoice equal this calculation
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.sub_total == invoice.sub_total
            && self.tax_total == invoice.tax_total
            && self.grand_total == invoice.grand_total
    }
}

/// GST-related errors
#[derive(Debug, thiserror::Error)]
pub enum GstError {
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
}

impl From<GstError> for crate::types::BillingError {
    fn from(error: GstError) -> Self {
        crate::types::BillingError::Validation(error.to_string())
    }
}
