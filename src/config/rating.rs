//! Rating system configuration

use crate::error::EngineResult;
use crate::rating::policy::{
    KFactorCurve, MarginCurve, PolicyPreset, RatingPolicy, UnknownPlayerPolicy,
    DEFAULT_BASELINE_RATING,
};
use serde::{Deserialize, Serialize};

/// Rating settings as they appear in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Named rating variant
    pub policy: PolicyPreset,
    /// Rating assumed for players without one
    pub baseline_rating: f64,
    /// Baseline or reject for unrated players
    pub unknown_player: UnknownPlayerPolicy,
    /// Override of the preset's upset bonus
    pub underdog_multiplier: Option<f64>,
    /// Override of the preset's K-factor curve
    pub k_curve: Option<KFactorCurve>,
    /// Override of the preset's margin-of-victory steps
    pub margin: Option<MarginCurve>,
    /// Rating given to seeded demo players
    pub seed_rating: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            policy: PolicyPreset::Shared,
            baseline_rating: DEFAULT_BASELINE_RATING,
            unknown_player: UnknownPlayerPolicy::Baseline,
            underdog_multiplier: None,
            k_curve: None,
            margin: None,
            seed_rating: 1000.0,
        }
    }
}

impl RatingConfig {
    /// Build and validate the full rating policy
    pub fn to_policy(&self) -> EngineResult<RatingPolicy> {
        let mut policy = RatingPolicy::preset(self.policy);
        policy.baseline_rating = self.baseline_rating;
        policy.unknown_player = self.unknown_player;
        if let Some(multiplier) = self.underdog_multiplier {
            policy.underdog_multiplier = multiplier;
        }
        if let Some(k_curve) = &self.k_curve {
            policy.k_curve = k_curve.clone();
        }
        if let Some(margin) = &self.margin {
            policy.margin = margin.clone();
        }
        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::policy::DeltaDistribution;

    #[test]
    fn test_default_policy() {
        let policy = RatingConfig::default().to_policy().unwrap();
        assert_eq!(policy, RatingPolicy::shared());
    }

    #[test]
    fn test_overrides_applied() {
        let config = RatingConfig {
            policy: PolicyPreset::Individual,
            baseline_rating: 1200.0,
            unknown_player: UnknownPlayerPolicy::Reject,
            underdog_multiplier: Some(1.15),
            ..RatingConfig::default()
        };

        let policy = config.to_policy().unwrap();
        assert_eq!(policy.distribution, DeltaDistribution::Individual);
        assert_eq!(policy.baseline_rating, 1200.0);
        assert_eq!(policy.unknown_player, UnknownPlayerPolicy::Reject);
        assert_eq!(policy.underdog_multiplier, 1.15);
    }

    #[test]
    fn test_curve_overrides_from_toml() {
        let raw = r#"
            policy = "flat"

            [k_curve]
            type = "bands"
            floor_k = 40.0
            bands = [
                { min_rating = 1800.0, k = 20.0 },
                { min_rating = 1200.0, k = 30.0 },
            ]

            [margin]
            steps = [{ min_difference = 3, multiplier = 1.2 }]
        "#;

        let config: RatingConfig = toml::from_str(raw).unwrap();
        let policy = config.to_policy().unwrap();

        assert_eq!(policy.distribution, DeltaDistribution::Even);
        assert_eq!(policy.k_curve.k_for(1900.0), 20.0);
        assert_eq!(policy.k_curve.k_for(1500.0), 30.0);
        assert_eq!(policy.k_curve.k_for(1000.0), 40.0);
        assert_eq!(policy.margin.factor(2), 1.0);
        assert_eq!(policy.margin.factor(5), 1.2);
    }

    #[test]
    fn test_invalid_curve_override_rejected() {
        let config = RatingConfig {
            k_curve: Some(KFactorCurve::Flat { k: 0.0 }),
            ..RatingConfig::default()
        };
        assert!(config.to_policy().is_err());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let config = RatingConfig {
            underdog_multiplier: Some(0.5),
            ..RatingConfig::default()
        };
        assert!(config.to_policy().is_err());
    }
}
