/// Decimal precision for stored monetary values
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for ratio fields (gain/loss %, allocation %)
pub const PCT_DECIMAL_PRECISION: u32 = 4;

/// Day-count denominator when annualizing irregular cash flows
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Length of the random suffix appended to snapshot slugs
pub const SLUG_SUFFIX_LEN: usize = 6;

/// Separator between a slug body and its random suffix
pub const SLUG_SUFFIX_SEPARATOR: char = '#';
