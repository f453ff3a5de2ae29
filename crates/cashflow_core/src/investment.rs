//! Payback period and internal rate of return of one trajectory
//!
//! Flows are net costs, year 1 first. Year 1 sits at `t = 0`, the same
//! convention `Discounter` uses, so an IRR makes the discounted total zero.
//! Negative flows are savings or income.

/// Bracket search for the IRR stops above this rate
const MAX_RATE: f64 = 1.0e6;
/// Bracket search for the IRR stops below `-1 + MIN_GROWTH`
const MIN_GROWTH: f64 = 1.0e-6;
const TOLERANCE: f64 = 1.0e-12;
const MAX_STEPS: usize = 200;

fn net_present_value(rate: f64, flows: &[f64]) -> f64 {
    let growth = 1.0 + rate;
    let mut factor = 1.0;
    let mut total = 0.0;
    for flow in flows {
        total += flow * factor;
        factor /= growth;
    }
    total
}

/// Years after the start year until the cumulative cost is recovered.
///
/// The cumulative cost must turn positive and then come back to zero or
/// below; the crossing year is interpolated linearly. `None` when that never
/// happens within the trajectory.
#[must_use]
pub fn payback_period(flows: &[f64]) -> Option<f64> {
    let mut cumulative = 0.0;
    for (t, &flow) in flows.iter().enumerate() {
        let previous = cumulative;
        cumulative += flow;
        if previous > 0.0 && cumulative <= 0.0 {
            // previous > 0 implies t >= 1 and flow < 0
            return Some((t - 1) as f64 + previous / -flow);
        }
    }
    None
}

/// Rate at which the discounted sum of `flows` is zero.
///
/// Searches outward from 0%, upward first, for a sign change and bisects it.
/// `None` when the flows never change sign, contain a non-finite value, or no
/// root lies in `(-1, MAX_RATE]`. With several sign changes the root closest
/// to 0% on the upward side wins.
#[must_use]
pub fn internal_rate_of_return(flows: &[f64]) -> Option<f64> {
    if flows.iter().any(|flow| !flow.is_finite()) {
        return None;
    }
    let has_cost = flows.iter().any(|&flow| flow > 0.0);
    let has_saving = flows.iter().any(|&flow| flow < 0.0);
    if !(has_cost && has_saving) {
        return None;
    }

    let (low, high) = bracket(flows)?;
    Some(bisect(flows, low, high))
}

/// Two rates whose net present values have opposite signs (or a shared exact root)
fn bracket(flows: &[f64]) -> Option<(f64, f64)> {
    let at_zero = net_present_value(0.0, flows);
    if at_zero == 0.0 {
        return Some((0.0, 0.0));
    }
    let crosses = |value: f64| value == 0.0 || value.signum() != at_zero.signum();

    let (mut previous, mut rate) = (0.0, 0.05);
    while rate <= MAX_RATE {
        let value = net_present_value(rate, flows);
        if !value.is_finite() {
            break;
        }
        if crosses(value) {
            return Some((previous, rate));
        }
        previous = rate;
        rate *= 2.0;
    }

    // Toward -100%: halve the remaining growth each step
    let (mut previous, mut rate) = (0.0, -0.5);
    while 1.0 + rate >= MIN_GROWTH {
        let value = net_present_value(rate, flows);
        if !value.is_finite() {
            break;
        }
        if crosses(value) {
            return Some((rate, previous));
        }
        previous = rate;
        rate = -1.0 + (1.0 + rate) / 2.0;
    }
    None
}

fn bisect(flows: &[f64], mut low: f64, mut high: f64) -> f64 {
    let mut low_value = net_present_value(low, flows);
    if low_value == 0.0 {
        return low;
    }

    for _ in 0..MAX_STEPS {
        if high - low <= TOLERANCE * high.abs().max(1.0) {
            break;
        }
        let mid = f64::midpoint(low, high);
        let value = net_present_value(mid, flows);
        if value == 0.0 {
            return mid;
        }
        if value.signum() == low_value.signum() {
            low = mid;
            low_value = value;
        } else {
            high = mid;
        }
    }
    f64::midpoint(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::Discounter;

    #[test]
    fn test_payback_interpolates_crossing_year() {
        let flows = [1000.0, -300.0, -300.0, -300.0, -300.0];
        let payback = payback_period(&flows).unwrap();
        assert!((payback - (3.0 + 100.0 / 300.0)).abs() < 1e-12);

        assert_eq!(payback_period(&[100.0, -100.0]), Some(1.0));
    }

    #[test]
    fn test_payback_undefined() {
        // Never recovered
        assert_eq!(payback_period(&[1000.0, -300.0, -300.0]), None);
        // Nothing to recover
        assert_eq!(payback_period(&[110.0, 10.0, 10.0]), None);
        assert_eq!(payback_period(&[-50.0, -10.0]), None);
        assert_eq!(payback_period(&[]), None);
    }

    #[test]
    fn test_payback_skips_leading_zero_years() {
        let flows = [0.0, 0.0, 200.0, -100.0, -100.0];
        assert_eq!(payback_period(&flows), Some(4.0));
    }

    #[test]
    fn test_irr_single_period() {
        let irr = internal_rate_of_return(&[100.0, -110.0]).unwrap();
        assert!((irr - 0.10).abs() < 1e-9, "got {irr}");
    }

    #[test]
    fn test_irr_matches_closed_form() {
        // 60v + 60v^2 = 100 with v = 1 / (1 + r)
        let v = (-1.0 + (1.0_f64 + 4.0 * 100.0 / 60.0).sqrt()) / 2.0;
        let expected = 1.0 / v - 1.0;

        let irr = internal_rate_of_return(&[100.0, -60.0, -60.0]).unwrap();
        assert!((irr - expected).abs() < 1e-9, "got {irr}, expected {expected}");

        // Sign convention does not move the root
        let flipped = internal_rate_of_return(&[-100.0, 60.0, 60.0]).unwrap();
        assert!((flipped - irr).abs() < 1e-12);
    }

    #[test]
    fn test_irr_zeroes_discounted_total() {
        let flows = [1000.0, -300.0, -300.0, -300.0, -300.0, -300.0];
        let irr = internal_rate_of_return(&flows).unwrap();
        let total = Discounter::new(irr).unwrap().total(&flows);
        assert!(total.abs() < 1e-6, "got {total}");
    }

    #[test]
    fn test_irr_negative_rate() {
        // Recover less than spent: negative return
        let irr = internal_rate_of_return(&[100.0, -90.0]).unwrap();
        assert!((irr - (-0.10)).abs() < 1e-9, "got {irr}");
    }

    #[test]
    fn test_irr_undefined() {
        assert_eq!(internal_rate_of_return(&[110.0, 10.0, 10.0]), None);
        assert_eq!(internal_rate_of_return(&[-1.0, -2.0]), None);
        assert_eq!(internal_rate_of_return(&[0.0, 0.0]), None);
        assert_eq!(internal_rate_of_return(&[100.0, f64::NAN]), None);
        assert_eq!(internal_rate_of_return(&[100.0, -f64::INFINITY]), None);
    }
}
