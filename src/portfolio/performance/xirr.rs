use chrono::NaiveDate;
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::DAYS_PER_YEAR;

const MAX_ITERATIONS: u32 = 100;
const CONVERGENCE_TOLERANCE: f64 = 1e-7;

/// Annualized money-weighted rate of return over irregularly dated cash
/// flows. Negative amounts are money invested, positive amounts money
/// returned (the terminal value goes in as a final positive flow).
///
/// Returns `None` when no meaningful rate exists: empty input, no sign
/// change, a zero or non-finite derivative during iteration, or no
/// convergence. Input order does not matter.
pub fn calculate_xirr(cash_flows: &[(NaiveDate, Decimal)]) -> Option<f64> {
    if cash_flows.is_empty() {
        return None;
    }

    let mut flows = cash_flows.to_vec();
    flows.sort_by_key(|(flow_date, _)| *flow_date);

    let has_inflow = flows.iter().any(|(_, amount)| *amount > Decimal::ZERO);
    let has_outflow = flows.iter().any(|(_, amount)| *amount < Decimal::ZERO);
    if !has_inflow || !has_outflow {
        return None;
    }

    let total_out: Decimal = flows
        .iter()
        .filter(|(_, amount)| *amount < Decimal::ZERO)
        .map(|(_, amount)| -*amount)
        .sum();
    let total_in: Decimal = flows
        .iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .map(|(_, amount)| *amount)
        .sum();

    let first_date = flows.first()?.0;
    let last_date = flows.last()?.0;

    // Zero date spread: annualizing is undefined, return the simple
    // percentage return instead.
    if first_date == last_date {
        return ((total_in - total_out) / total_out)
            .to_f64()
            .filter(|rate| rate.is_finite());
    }

    let series: Option<Vec<(f64, f64)>> = flows
        .iter()
        .map(|(flow_date, amount)| {
            let years = (*flow_date - first_date).num_days() as f64 / DAYS_PER_YEAR;
            amount.to_f64().map(|a| (a, years))
        })
        .collect();
    let series = series?;

    // Seed from the simple two-point return extrapolated to a 365-day
    // period.
    let span_days = (last_date - first_date).num_days() as f64;
    let simple_return = ((total_in - total_out) / total_out).to_f64().unwrap_or(0.1);
    let mut rate = simple_return * DAYS_PER_YEAR / span_days;
    if !rate.is_finite() || rate <= -1.0 {
        rate = 0.1;
    }

    for iteration in 0..MAX_ITERATIONS {
        let (npv, derivative) = npv_and_derivative(&series, rate);
        if !npv.is_finite() || !derivative.is_finite() || derivative == 0.0 {
            return None;
        }

        let next = rate - npv / derivative;
        if !next.is_finite() {
            return None;
        }
        if (next - rate).abs() < CONVERGENCE_TOLERANCE {
            debug!("XIRR converged to {} after {} iterations", next, iteration);
            return Some(next);
        }
        rate = next;
    }

    None
}

/// Net present value and its derivative at `rate` over `(amount, years)`
/// pairs.
fn npv_and_derivative(series: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut derivative = 0.0;
    for (amount, years) in series {
        let discount = (1.0 + rate).powf(*years);
        npv += amount / discount;
        derivative -= years * amount / (discount * (1.0 + rate));
    }
    (npv, derivative)
}
