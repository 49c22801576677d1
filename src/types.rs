//! Core types and data structures for the billing system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Payment status of an invoice. Transitions are manual only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Settled by the customer
    Paid,
    /// Issued and awaiting payment (initial state)
    #[default]
    Pending,
    /// Marked late by the owner
    Overdue,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Paid => write!(f, "PAID"),
            InvoiceStatus::Pending => write!(f, "PENDING"),
            InvoiceStatus::Overdue => write!(f, "OVERDUE"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAID" => Ok(InvoiceStatus::Paid),
            "PENDING" => Ok(InvoiceStatus::Pending),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            other => Err(BillingError::Validation(format!(
                "Unknown invoice status: '{}'",
                other
            ))),
        }
    }
}

/// Opaque image payload (base64 or data URI) attached to a factory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageBlob(pub String);

impl ImageBlob {
    /// Base64 encoding of the PNG signature bytes `\x89PNG\r\n\x1a\n`
    const PNG_BASE64_MAGIC: &'static str = "iVBORw0KGgo";

    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether the payload is a PNG image, either as a data URI or raw base64
    pub fn is_png(&self) -> bool {
        let data = self.0.trim();
        if let Some(rest) = data.strip_prefix("data:") {
            return rest.starts_with("image/png");
        }
        data.starts_with(Self::PNG_BASE64_MAGIC)
    }
}

/// Delivery address owned by a customer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub id: String,
    /// Label shown on the ship-to block
    pub name: String,
    pub address: String,
    /// When set the address mirrors the customer's billing address
    #[serde(default)]
    pub is_same_as_billing: bool,
}

impl ShippingAddress {
    pub fn new(id: String, name: String, address: String) -> Self {
        Self {
            id,
            name,
            address,
            is_same_as_billing: false,
        }
    }

    /// Shipping entry that follows the billing address
    pub fn same_as_billing(id: String, name: String) -> Self {
        Self {
            id,
            name,
            address: String::new(),
            is_same_as_billing: true,
        }
    }
}

/// Buyer of goods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique, immutable identifier
    pub id: String,
    pub name: String,
    /// 15 character GST registration, absent for unregistered buyers
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub gstin: Option<String>,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// Billing address
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub shipping_addresses: Vec<ShippingAddress>,
    /// Explicit two digit state code, overrides the GSTIN prefix
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state_code: Option<String>,
}

impl Customer {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            gstin: None,
            contact_person: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            is_active: true,
            shipping_addresses: Vec::new(),
            state_code: None,
        }
    }

    /// State code used for the place-of-supply decision
    pub fn state_code(&self) -> Option<String> {
        resolve_state_code(self.state_code.as_deref(), self.gstin.as_deref())
    }

    /// Re-mirror every `is_same_as_billing` entry from the billing address
    pub fn sync_shipping_addresses(&mut self) {
        let billing = self.address.clone();
        for shipping in self
            .shipping_addresses
            .iter_mut()
            .filter(|s| s.is_same_as_billing)
        {
            shipping.address = billing.clone();
        }
    }

    pub fn shipping_address(&self, shipping_id: &str) -> Option<&ShippingAddress> {
        self.shipping_addresses.iter().find(|s| s.id == shipping_id)
    }
}

/// Billing unit that appears as the seller on invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit_type: Option<String>,
    pub gstin: String,
    /// Full postal address, comma separated with the city/state last
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub pincode: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub bank_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ifsc_code: Option<String>,
    #[serde(default)]
    pub logo: Option<ImageBlob>,
    #[serde(default)]
    pub signature: Option<ImageBlob>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state_code: Option<String>,
}

impl Factory {
    pub fn new(id: String, name: String, gstin: String, location: String) -> Self {
        Self {
            id,
            name,
            unit_type: None,
            gstin,
            location,
            phone: None,
            pincode: None,
            bank_name: None,
            account_number: None,
            ifsc_code: None,
            logo: None,
            signature: None,
            is_active: true,
            state_code: None,
        }
    }

    pub fn state_code(&self) -> Option<String> {
        resolve_state_code(self.state_code.as_deref(), Some(&self.gstin))
    }

    /// Last comma-delimited segment of the location
    pub fn place_of_supply(&self) -> Option<&str> {
        self.location
            .rsplit(',')
            .next()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
    }

    pub fn has_bank_details(&self) -> bool {
        self.bank_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

/// Catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub hsn_code: String,
    /// Unit price, tax inclusive when `is_inclusive` is set
    #[serde(deserialize_with = "deserialize_decimal")]
    pub price: BigDecimal,
    /// GST percentage
    #[serde(deserialize_with = "deserialize_decimal")]
    pub gst_rate: BigDecimal,
    #[serde(default)]
    pub is_inclusive: bool,
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    pub fn new(
        id: String,
        name: String,
        hsn_code: String,
        price: BigDecimal,
        gst_rate: BigDecimal,
    ) -> Self {
        Self {
            id,
            name,
            hsn_code,
            price,
            gst_rate,
            is_inclusive: false,
            category: None,
        }
    }
}

/// Invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    /// Absent for ad hoc lines not taken from the catalogue
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub product_id: Option<String>,
    pub product_name: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub quantity: BigDecimal,
    /// Unit price actually billed
    #[serde(deserialize_with = "deserialize_decimal")]
    pub rate: BigDecimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub gst_rate: BigDecimal,
    #[serde(default)]
    pub is_inclusive: Option<bool>,
    /// Stored copy of the computed line tax
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub tax_amount: BigDecimal,
    /// Stored copy of the computed line total
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub total: BigDecimal,
}

impl InvoiceItem {
    pub fn new(
        id: String,
        product_name: String,
        quantity: BigDecimal,
        rate: BigDecimal,
        gst_rate: BigDecimal,
    ) -> Self {
        Self {
            id,
            product_id: None,
            product_name,
            quantity,
            rate,
            gst_rate,
            is_inclusive: None,
            tax_amount: BigDecimal::from(0),
            total: BigDecimal::from(0),
        }
    }

    /// Line prefilled from a catalogue product
    pub fn from_product(id: String, product: &Product, quantity: BigDecimal) -> Self {
        Self {
            id,
            product_id: Some(product.id.clone()),
            product_name: product.name.clone(),
            quantity,
            rate: product.price.clone(),
            gst_rate: product.gst_rate.clone(),
            is_inclusive: Some(product.is_inclusive),
            tax_amount: BigDecimal::from(0),
            total: BigDecimal::from(0),
        }
    }

    pub fn inclusive(mut self, is_inclusive: bool) -> Self {
        self.is_inclusive = Some(is_inclusive);
        self
    }

    pub fn is_inclusive(&self) -> bool {
        self.is_inclusive.unwrap_or(false)
    }
}

/// Tax invoice with denormalized party snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    #[serde(deserialize_with = "deserialize_stored_date")]
    pub date: NaiveDate,
    pub customer_id: String,
    /// Customer name at save time
    pub customer_name: String,
    /// Factory name at save time
    #[serde(default)]
    pub branch_name: Option<String>,
    /// Shipping address copied at save time
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    pub items: Vec<InvoiceItem>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub sub_total: BigDecimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub tax_total: BigDecimal,
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub discount: BigDecimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub grand_total: BigDecimal,
    #[serde(default)]
    pub status: InvoiceStatus,
    /// Supply crosses state borders (IGST instead of CGST + SGST)
    #[serde(default)]
    pub is_interstate: bool,
}

impl Invoice {
    pub fn is_in_month(&self, year: i32, month: u32) -> bool {
        use chrono::Datelike;
        self.date.year() == year && self.date.month() == month
    }
}

/// State code from an explicit field, else from the first two GSTIN digits
pub(crate) fn resolve_state_code(explicit: Option<&str>, gstin: Option<&str>) -> Option<String> {
    let two_digits = |value: &str| {
        let code: String = value.trim().chars().take(2).collect();
        (code.len() == 2 && code.chars().all(|c| c.is_ascii_digit())).then_some(code)
    };

    explicit
        .and_then(two_digits)
        .or_else(|| gstin.and_then(two_digits))
}

fn default_true() -> bool {
    true
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Reads an invoice date that may carry a `T...` time part.
fn deserialize_stored_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    crate::format::parse_iso_date(&raw).map_err(serde::de::Error::custom)
}

/// Reads a decimal from a JSON string or number.
///
/// Floats go through their shortest round-trip text, so a stored `45.1`
/// becomes exactly `45.1` instead of its binary expansion.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::str::FromStr;

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = BigDecimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal number or a string holding one")
        }

        fn visit_f64<E>(self, value: f64) -> Result<BigDecimal, E>
        where
            E: de::Error,
        {
            if !value.is_finite() {
                return Err(de::Error::invalid_value(
                    de::Unexpected::Float(value),
                    &"a finite number",
                ));
            }
            BigDecimal::from_str(&value.to_string()).map_err(de::Error::custom)
        }

        fn visit_i64<E>(self, value: i64) -> Result<BigDecimal, E>
        where
            E: de::Error,
        {
            Ok(BigDecimal::from(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<BigDecimal, E>
        where
            E: de::Error,
        {
            Ok(BigDecimal::from(value))
        }

        fn visit_str<E>(self, value: &str) -> Result<BigDecimal, E>
        where
            E: de::Error,
        {
            BigDecimal::from_str(value.trim())
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}

/// Failures while handing a rendered document to a share/save target
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("No share or save target is available")]
    NoTarget,
    #[error("Failed to write document to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur in the billing system
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),
    #[error("Factory not found: {0}")]
    FactoryNotFound(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Import of {collection} failed: {reason}")]
    Import { collection: String, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Document sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
