//! Validation utilities

use crate::config::TaxPolicy;
use crate::tax::gst::validate_gst_rate;
use crate::traits::*;
use crate::types::*;
use bigdecimal::{BigDecimal, Zero};

/// Validate a GSTIN: 15 uppercase alphanumerics starting with a known state code
pub fn validate_gstin(gstin: &str) -> BillingResult<()> {
    let gstin = gstin.trim();

    if gstin.len() != 15 {
        return Err(BillingError::Validation(format!(
            "GSTIN '{}' must be exactly 15 characters",
            gstin
        )));
    }

    if !gstin
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        return Err(BillingError::Validation(format!(
            "GSTIN '{}' can only contain digits and uppercase letters",
            gstin
        )));
    }

    let state: u32 = gstin[..2].parse().map_err(|_| {
        BillingError::Validation(format!("GSTIN '{}' must start with a state code", gstin))
    })?;
    if !matches!(state, 1..=38 | 97 | 99) {
        return Err(BillingError::Validation(format!(
            "GSTIN '{}' has unknown state code {:02}",
            gstin, state
        )));
    }

    Ok(())
}

/// Validate a six digit postal code
pub fn validate_pincode(pincode: &str) -> BillingResult<()> {
    let pincode = pincode.trim();
    if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err(BillingError::Validation(format!(
            "Pincode '{}' must be 6 digits",
            pincode
        )));
    }
    if pincode.starts_with('0') {
        return Err(BillingError::Validation(format!(
            "Pincode '{}' cannot start with 0",
            pincode
        )));
    }
    Ok(())
}

/// Validate an IFSC code: four letters, a zero, six alphanumerics
pub fn validate_ifsc(ifsc: &str) -> BillingResult<()> {
    let ifsc = ifsc.trim();
    let bytes = ifsc.as_bytes();

    let valid = bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());

    if valid {
        Ok(())
    } else {
        Err(BillingError::Validation(format!(
            "IFSC code '{}' must look like ABCD0123456",
            ifsc
        )))
    }
}

/// Signatures are printed as PNG with transparency
pub fn validate_signature(signature: &ImageBlob) -> BillingResult<()> {
    if signature.is_empty() || signature.is_png() {
        Ok(())
    } else {
        Err(BillingError::Validation(
            "Signature image must be a PNG".to_string(),
        ))
    }
}

/// Validate a GST percentage against the slab list
pub fn validate_rate(rate: &BigDecimal, allow_special: bool) -> BillingResult<()> {
    validate_gst_rate(rate, allow_special)?;
    Ok(())
}

/// Enhanced entity validator: required fields plus format and slab checks
pub struct EnhancedEntityValidator {
    pub allow_special_rate: bool,
    pub reject_excess_discount: bool,
}

impl EnhancedEntityValidator {
    pub fn from_policy(policy: &TaxPolicy) -> Self {
        Self {
            allow_special_rate: policy.allow_special_rate,
            reject_excess_discount: policy.reject_excess_discount,
        }
    }
}

impl Default for EnhancedEntityValidator {
    fn default() -> Self {
        Self::from_policy(&TaxPolicy::default())
    }
}

impl EntityValidator for EnhancedEntityValidator {
    fn validate_customer(&self, customer: &Customer) -> BillingResult<()> {
        DefaultEntityValidator.validate_customer(customer)?;

        if let Some(gstin) = &customer.gstin {
            validate_gstin(gstin)?;
        }

        Ok(())
    }

    fn validate_factory(&self, factory: &Factory) -> BillingResult<()> {
        DefaultEntityValidator.validate_factory(factory)?;
        validate_gstin(&factory.gstin)?;

        if let Some(pincode) = &factory.pincode {
            validate_pincode(pincode)?;
        }
        if let Some(ifsc) = &factory.ifsc_code {
            validate_ifsc(ifsc)?;
        }
        if let Some(signature) = &factory.signature {
            validate_signature(signature)?;
        }

        Ok(())
    }

    fn validate_product(&self, product: &Product) -> BillingResult<()> {
        DefaultEntityValidator.validate_product(product)?;
        validate_rate(&product.gst_rate, self.allow_special_rate)
    }

    fn validate_invoice(&self, invoice: &Invoice) -> BillingResult<()> {
        DefaultEntityValidator.validate_invoice(invoice)?;

        for item in &invoice.items {
            validate_rate(&item.gst_rate, self.allow_special_rate)?;
            if item.rate < BigDecimal::zero() {
                return Err(BillingError::Validation(format!(
                    "Rate of '{}' cannot be negative",
                    item.product_name
                )));
            }
        }

        if self.reject_excess_discount && invoice.grand_total < BigDecimal::zero() {
            return Err(BillingError::Validation(format!(
                "Discount {} exceeds the invoice value {}",
                invoice.discount,
                &invoice.sub_total + &invoice.tax_total
            )));
        }

        Ok(())
    }
}
