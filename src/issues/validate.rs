use super::types::Issue;

/// Whether an issue can be placed on the map
pub fn is_mappable(issue: &Issue) -> bool {
    issue.position().is_some()
}

/// Mappable issues in their original order. Everything else is skipped quietly.
pub fn mappable(issues: &[Issue]) -> Vec<&Issue> {
    issues.iter().filter(|issue| is_mappable(issue)).collect()
}
