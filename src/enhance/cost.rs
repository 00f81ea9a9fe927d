//! Market cost of one enhancement attempt.
//!
//! cost(level) = floor(tier^3 * (level + 1)^2.7 / divisor(level) / 1_000_000), in millions,
//! times 0.7 when discounted. The divisor has fixed cliffs at 17, 18, 19 and 21.

pub const DEFAULT_COST_DIVISOR: f64 = 200.0;
pub const COST_EXPONENT: f64 = 2.7;
pub const COST_UNIT: f64 = 1_000_000.0;
pub const DISCOUNT_FACTOR: f64 = 0.7;

/// Level-dependent normalization divisor.
pub const fn cost_divisor(level: u32) -> f64 {
    match level {
        17 => 150.0,
        18 => 70.0,
        19 => 45.0,
        21 => 125.0,
        _ => DEFAULT_COST_DIVISOR,
    }
}

/// Unrounded cost in millions. The million-scaling step truncates.
pub fn compute_cost(level: u32, equipment_tier: u32, discount: bool) -> f64 {
    let tier = equipment_tier as f64;
    let raw = tier.powi(3) * (level as f64 + 1.0).powf(COST_EXPONENT) / cost_divisor(level);
    let millions = (raw / COST_UNIT).floor();
    if discount {
        millions * DISCOUNT_FACTOR
    } else {
        millions
    }
}

/// Cost as stored in the probability table: [compute_cost] rounded half-to-even.
pub fn attempt_cost(level: u32, equipment_tier: u32, discount: bool) -> u64 {
    compute_cost(level, equipment_tier, discount).round_ties_even() as u64
}
