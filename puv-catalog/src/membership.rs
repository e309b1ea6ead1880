use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::fare::Fare;

/// Every plan starts with the same free trial.
pub const FREE_TRIAL_DAYS: u32 = 7;

/// Subscription tiers offered to riders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipPlan {
    Basic,
    Premium,
    Business,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub plan: MembershipPlan,
    pub name: &'static str,
    pub monthly: Fare,
    pub yearly: Fare,
    pub yearly_savings_percent: u32,
    pub free_trial_days: u32,
    pub features: &'static [&'static str],
}

impl MembershipPlan {
    pub const ALL: [MembershipPlan; 3] = [
        MembershipPlan::Basic,
        MembershipPlan::Premium,
        MembershipPlan::Business,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MembershipPlan::Basic => "Basic",
            MembershipPlan::Premium => "Premium",
            MembershipPlan::Business => "Business",
        }
    }

    pub fn monthly_price(&self) -> Fare {
        match self {
            MembershipPlan::Basic => Fare::pesos(199),
            MembershipPlan::Premium => Fare::pesos(399),
            MembershipPlan::Business => Fare::pesos(699),
        }
    }

    pub fn yearly_price(&self) -> Fare {
        match self {
            MembershipPlan::Basic => Fare::pesos(1_999),
            MembershipPlan::Premium => Fare::pesos(3_999),
            MembershipPlan::Business => Fare::pesos(6_999),
        }
    }

    pub fn features(&self) -> &'static [&'static str] {
        match self {
            MembershipPlan::Basic => &[
                "Book regular eJeep rides",
                "View estimated arrival times",
                "Basic route planning",
            ],
            MembershipPlan::Premium => &[
                "Priority booking during peak hours",
                "Real-time driver location tracking",
                "Route optimization",
                "24/7 customer support",
                "Offline route maps",
            ],
            MembershipPlan::Business => &[
                "All Premium features",
                "Corporate billing",
                "Multiple seat reservations",
                "Schedule recurring rides",
                "Dedicated support hotline",
                "Custom route planning",
            ],
        }
    }

    /// Discount of the yearly price against twelve monthly payments, floored.
    pub fn yearly_savings_percent(&self) -> u32 {
        let twelve_months = self.monthly_price().amount_centavos * 12;
        if twelve_months == 0 {
            return 0;
        }
        let saved = twelve_months - self.yearly_price().amount_centavos;
        (saved.max(0) * 100 / twelve_months) as u32
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            plan: *self,
            name: self.name(),
            monthly: self.monthly_price(),
            yearly: self.yearly_price(),
            yearly_savings_percent: self.yearly_savings_percent(),
            free_trial_days: FREE_TRIAL_DAYS,
            features: self.features(),
        }
    }
}

impl FromStr for MembershipPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(MembershipPlan::Basic),
            "premium" => Ok(MembershipPlan::Premium),
            "business" => Ok(MembershipPlan::Business),
            other => Err(format!("unknown membership plan: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yearly_savings_match_advertised() {
        for plan in MembershipPlan::ALL {
            assert_eq!(plan.yearly_savings_percent(), 16, "{:?}", plan);
        }
    }

    #[test]
    fn test_plan_summary() {
        let summary = MembershipPlan::Premium.summary();
        assert_eq!(summary.monthly.to_string(), "₱399");
        assert_eq!(summary.yearly.to_string(), "₱3,999");
        assert_eq!(summary.features.len(), 5);
        assert_eq!(summary.free_trial_days, 7);
        assert_eq!("business".parse::<MembershipPlan>().unwrap(), MembershipPlan::Business);
    }
}
