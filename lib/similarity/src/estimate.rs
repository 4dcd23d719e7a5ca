//! Point estimates from retrieved cases

use casebase_core::Case;
use serde::{Serialize, Serializer};

/// Outcome estimate for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    /// Mean outcome over `support` retrieved cases
    Available { value: f64, support: usize },
    /// Nothing was retrieved, so nothing can be estimated
    Unavailable,
}

impl Estimate {
    pub fn value(&self) -> Option<f64> {
        match self {
            Estimate::Available { value, .. } => Some(*value),
            Estimate::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Estimate::Available { .. })
    }
}

/// Serialises as the estimated number, or `null`
impl Serialize for Estimate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Reduces the outcomes of retrieved cases to one estimate
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateAggregator;

impl EstimateAggregator {
    /// Arithmetic mean of the target over `cases`
    pub fn aggregate<'a, I>(&self, cases: I) -> Estimate
    where
        I: IntoIterator<Item = &'a Case>,
    {
        let (sum, support) = cases
            .into_iter()
            .fold((0.0f64, 0usize), |(sum, n), case| (sum + case.target, n + 1));

        if support == 0 {
            Estimate::Unavailable
        } else {
            Estimate::Available {
                value: sum / support as f64,
                support,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebase_core::{CaseId, Features};

    fn case(id: usize, target: f64) -> Case {
        Case::new(CaseId(id), Features::new(vec![], vec![]), target)
    }

    #[test]
    fn test_mean_of_targets() {
        let cases = vec![case(0, 8000.0), case(1, 11000.0), case(2, 9500.0)];
        let estimate = EstimateAggregator.aggregate(&cases);
        assert_eq!(estimate, Estimate::Available { value: 9500.0, support: 3 });
    }

    #[test]
    fn test_empty_is_unavailable_not_zero() {
        let estimate = EstimateAggregator.aggregate(&Vec::<Case>::new());
        assert_eq!(estimate, Estimate::Unavailable);
        assert_eq!(estimate.value(), None);
        assert!(!estimate.is_available());
    }

    #[test]
    fn test_serialization() {
        let available = Estimate::Available { value: 8000.0, support: 1 };
        assert_eq!(serde_json::to_string(&available).unwrap(), "8000.0");
        assert_eq!(serde_json::to_string(&Estimate::Unavailable).unwrap(), "null");
    }
}
