use rust_decimal::Decimal;
use validator::ValidationError;

/// Prices and totals are stored with cent precision.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a price or total may hold, `99999999.99`.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE);

/// Rejects negative amounts, amounts above [`MAX_MONEY`] and amounts with more than
/// two decimal places.
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    if *value > MAX_MONEY {
        return Err(ValidationError::new("amount_too_large"));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::new("too_many_decimal_places"));
    }
    Ok(())
}

/// Pads an amount out to two decimal places, so `10.5` is stored as `10.50`.
pub fn to_cents(mut value: Decimal) -> Decimal {
    value.rescale(MONEY_SCALE);
    value
}

/// Renders an amount the way the storefront shows it, e.g. `$49.99`.
pub fn format_money(value: &Decimal) -> String {
    format!("${:.2}", value.round_dp(MONEY_SCALE))
}
