use crate::wire::MvpPlan;
use std::collections::HashSet;

pub const BASE_PACKAGE_COST: u64 = 10_000;
pub const ADDITIONAL_FEATURE_COST: u64 = 3_333;
pub const BASE_FEATURE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub features: usize,
    pub development_cost: u64,
    pub weeks: u32,
}

/// Counts below the base package are still billed as the base package.
pub fn development_cost(feature_count: usize) -> u64 {
    let extra = feature_count.saturating_sub(BASE_FEATURE_COUNT) as u64;
    BASE_PACKAGE_COST + ADDITIONAL_FEATURE_COST * extra
}

/// 3 → 4 weeks, 4–5 → 5, 6–7 → 6, 8–9 → 7, and one more week per two
/// features after that.
pub fn timeline_weeks(feature_count: usize) -> u32 {
    let n = feature_count.max(BASE_FEATURE_COUNT);
    if n == BASE_FEATURE_COUNT {
        return 4;
    }
    (5 + (n - 4) / 2) as u32
}

pub fn quote(feature_count: usize) -> Quote {
    Quote {
        features: feature_count,
        development_cost: development_cost(feature_count),
        weeks: timeline_weeks(feature_count),
    }
}

/// Check a schema-valid plan against the pricing and timeline rules.
/// Returns human-readable warnings; an empty list means the plan is consistent.
pub fn audit(plan: &MvpPlan) -> Vec<String> {
    let mut warnings = Vec::new();
    let core = plan.features.core.len();
    let additional = plan.features.additional.len();
    let total = core + additional;
    let expected = quote(total);

    let inv = &plan.investment;
    if inv.development_cost != expected.development_cost {
        warnings.push(format!(
            "developmentCost is {} but {} features price at {}",
            inv.development_cost, total, expected.development_cost
        ));
    }

    let priced = inv.feature_breakdown.additional_features.len();
    if priced != additional {
        warnings.push(format!(
            "featureBreakdown lists {} additional features but features.additional has {}",
            priced, additional
        ));
    }
    let listed: u64 = BASE_PACKAGE_COST
        + inv
            .feature_breakdown
            .additional_features
            .iter()
            .map(|f| f.cost)
            .sum::<u64>();
    if listed != inv.development_cost {
        warnings.push(format!(
            "featureBreakdown sums to {} but developmentCost is {}",
            listed, inv.development_cost
        ));
    }

    let weeks = plan.timeline.len() as u32;
    if weeks != expected.weeks {
        warnings.push(format!(
            "timeline has {} weeks but {} features call for {}",
            weeks, total, expected.weeks
        ));
    }
    for (i, m) in plan.timeline.iter().enumerate() {
        if m.week != i as u32 + 1 {
            warnings.push(format!("timeline entry {} is numbered week {}", i + 1, m.week));
        }
    }

    let core_names: HashSet<String> =
        plan.features.core.iter().map(|f| normalize(&f.name)).collect();
    for name in &inv.feature_breakdown.base_package.features {
        if !core_names.contains(&normalize(name)) {
            warnings.push(format!("basePackage feature \"{}\" is not a core feature", name));
        }
    }

    let mut seen = HashSet::new();
    for f in plan.features.core.iter().chain(plan.features.additional.iter()) {
        if !seen.insert(normalize(&f.name)) {
            warnings.push(format!("duplicate feature \"{}\"", f.name));
        }
    }

    warnings
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
