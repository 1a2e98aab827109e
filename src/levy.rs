/// Levy module: rules for the zakat charged on every transfer
use crate::Amount;

/// Levy owed on a transfer of `amount`.
pub fn levy_for(amount: Amount, rate: Amount) -> Amount {
    amount * rate
}

/// Full cost to the sender of a transfer: the amount plus its levy.
pub fn total_cost(amount: Amount, rate: Amount) -> Amount {
    amount + levy_for(amount, rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LEVY_RATE;

    #[test]
    fn test_levy_is_two_and_a_half_percent() {
        assert!((levy_for(50.0, LEVY_RATE) - 1.25).abs() < 1e-9);
        assert!((levy_for(200.0, LEVY_RATE) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_cost() {
        assert!((total_cost(50.0, LEVY_RATE) - 51.25).abs() < 1e-9);
        assert_eq!(total_cost(10.0, 0.0), 10.0);
    }
}
