use std::{
    fmt::{Display, Formatter},
    ops::{Div, Mul},
};

use crate::quantity::{Quantity, cost::Cost, rate::KilowattHourRate};

pub type KilowattHours = Quantity<f64, 1, 1, 0>;

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost::from(self.0 * rhs.0)
    }
}

/// Energy over energy is a bare ratio, used for the state-of-charge math.
impl Div for KilowattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_times_rate() {
        assert_eq!(KilowattHours::from(10.0) * KilowattHourRate::from(0.17), Cost::from(1.7));
    }

    #[test]
    fn test_ratio() {
        assert_eq!(KilowattHours::from(10.0) / KilowattHours::from(20.0), 0.5);
    }
}
