use crate::types::{Operator, VersionRule};

/// Parse a version specifier string into an ordered list of rules.
///
/// Accepts comma separated constraints as used by requirement strings
/// (`>=1.0,<2.0`) as well as Poetry-style ranges (`^1.2`, `~1.2`, bare
/// `1.2.3`). `||` is treated like a comma, so alternatives are flattened
/// into one conjunctive list. Segments that match no operator and are
/// not a bare version are dropped.
pub fn parse_specifier(spec: &str) -> Vec<VersionRule> {
    spec.replace("||", ",")
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> Option<VersionRule> {
    for op in Operator::PRIORITY {
        if let Some(rest) = segment.strip_prefix(op.symbol()) {
            return Some(VersionRule::new(op, rest.trim()));
        }
    }

    // Legacy dialects treat a bare version as an exact pin
    if segment.starts_with(|c: char| c.is_ascii_digit() || c == '*') {
        return Some(VersionRule::new(Operator::Eq, segment));
    }

    None
}

/// Version of the first exact-equality rule
pub fn pinned_version(rules: &[VersionRule]) -> Option<&str> {
    rules
        .iter()
        .find(|rule| rule.operator == Operator::Eq)
        .map(|rule| rule.version.as_str())
}
