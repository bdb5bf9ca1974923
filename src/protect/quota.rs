//! Cluster resource-quota and disruption-budget checks.
//!
//! Both limits and current usage are externally supplied by the
//! cluster-state collaborator; this module only does the arithmetic,
//! including Kubernetes-style quantity parsing (`500m`, `4Gi`).

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QuotaViolation {
    #[error("resource {resource}: requested {requested} exceeds hard limit {limit}")]
    Exceeded {
        resource: String,
        requested: String,
        limit: String,
    },
    #[error("resource {resource}: unparseable quantity {value}")]
    BadQuantity { resource: String, value: String },
    #[error("disruption of {disruptions} would leave {left} replicas, below min_available {min_available}")]
    BudgetViolated {
        disruptions: u32,
        left: u32,
        min_available: u32,
    },
}

/// Parse a quantity into base units. Plain and decimal numbers pass
/// through; `m` is millis (cpu), `k/M/G/T` are decimal multiples and
/// `Ki/Mi/Gi/Ti` binary multiples (memory).
pub fn parse_quantity(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (num, suffix) = s.split_at(split);
    let value: f64 = num.parse().ok()?;
    let factor = match suffix {
        "" => 1.0,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "Ki" => 1024.0,
        "Mi" => 1024.0 * 1024.0,
        "Gi" => 1024.0 * 1024.0 * 1024.0,
        "Ti" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some(value * factor)
}

/// A namespace's hard limits per resource name.
#[derive(Debug, Clone, Default)]
pub struct ResourceQuota {
    hard: HashMap<String, String>,
}

impl ResourceQuota {
    pub fn new(hard: HashMap<String, String>) -> Self {
        Self { hard }
    }

    /// Check a requested resource map. Any dimension exceeding its hard
    /// limit rejects; unparseable quantities reject (fail closed).
    pub fn check(&self, requested: &HashMap<String, String>) -> Result<(), QuotaViolation> {
        for (resource, value) in requested {
            let Some(limit) = self.hard.get(resource) else {
                // Unlimited dimensions are the collaborator's call.
                continue;
            };
            let req = parse_quantity(value).ok_or_else(|| QuotaViolation::BadQuantity {
                resource: resource.clone(),
                value: value.clone(),
            })?;
            let lim = parse_quantity(limit).ok_or_else(|| QuotaViolation::BadQuantity {
                resource: resource.clone(),
                value: limit.clone(),
            })?;
            if req > lim {
                return Err(QuotaViolation::Exceeded {
                    resource: resource.clone(),
                    requested: value.clone(),
                    limit: limit.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A disruption budget: how many replicas must stay available.
#[derive(Debug, Clone, Copy)]
pub struct DisruptionBudget {
    pub min_available: u32,
    pub total_replicas: u32,
}

impl DisruptionBudget {
    /// Permit the disruption only if enough replicas remain available.
    pub fn check(&self, disruptions: u32) -> Result<(), QuotaViolation> {
        let left = self.total_replicas.saturating_sub(disruptions);
        if left >= self.min_available {
            Ok(())
        } else {
            Err(QuotaViolation::BudgetViolated {
                disruptions,
                left,
                min_available: self.min_available,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_quantities() {
        assert_eq!(parse_quantity("10"), Some(10.0));
        assert_eq!(parse_quantity("500m"), Some(0.5));
        assert_eq!(parse_quantity("4Gi"), Some(4.0 * 1024.0 * 1024.0 * 1024.0));
        assert_eq!(parse_quantity("1.5"), Some(1.5));
        assert_eq!(parse_quantity("2M"), Some(2e6));
        assert_eq!(parse_quantity("bogus"), None);
        assert_eq!(parse_quantity(""), None);
    }

    #[test]
    fn quota_denies_excess_cpu() {
        let quota = ResourceQuota::new(map(&[("cpu", "10"), ("memory", "20Gi")]));
        let err = quota
            .check(&map(&[("cpu", "15"), ("memory", "4Gi")]))
            .unwrap_err();
        assert!(matches!(err, QuotaViolation::Exceeded { resource, .. } if resource == "cpu"));
    }

    #[test]
    fn quota_allows_within_limits() {
        let quota = ResourceQuota::new(map(&[("cpu", "10"), ("memory", "20Gi")]));
        assert!(quota.check(&map(&[("cpu", "2"), ("memory", "4Gi")])).is_ok());
    }

    #[test]
    fn quota_compares_across_units() {
        let quota = ResourceQuota::new(map(&[("cpu", "1")]));
        assert!(quota.check(&map(&[("cpu", "500m")])).is_ok());
        assert!(quota.check(&map(&[("cpu", "1500m")])).is_err());
    }

    #[test]
    fn quota_rejects_unparseable_request() {
        let quota = ResourceQuota::new(map(&[("cpu", "10")]));
        let err = quota.check(&map(&[("cpu", "lots")])).unwrap_err();
        assert!(matches!(err, QuotaViolation::BadQuantity { .. }));
    }

    #[test]
    fn budget_arithmetic() {
        let tight = DisruptionBudget {
            min_available: 3,
            total_replicas: 3,
        };
        assert!(tight.check(1).is_err());

        let roomy = DisruptionBudget {
            min_available: 3,
            total_replicas: 5,
        };
        assert!(roomy.check(1).is_ok());
        assert!(roomy.check(2).is_ok());
        assert!(roomy.check(3).is_err());
    }
}
