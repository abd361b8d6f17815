//! Trigger ARNs
//!
//! Tags are addressed by ARN rather than by name:
//! `arn:<partition>:glue:<region>:<account>:trigger/<name>`.

use regex::Regex;
use std::sync::LazyLock;

static CHINA_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cn").expect("valid china region regex (verified by tests)"));

static GOV_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gov").expect("valid gov region regex (verified by tests)"));

static TRIGGER_ARN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:[^:]+:glue:[^:]*:[^:]*:trigger/(.+)$")
        .expect("valid trigger arn regex (verified by tests)")
});

/// Partition a region belongs to
pub fn partition(region: &str) -> &'static str {
    if CHINA_REGION.is_match(region) {
        "aws-cn"
    } else if GOV_REGION.is_match(region) {
        "aws-us-gov"
    } else {
        "aws"
    }
}

/// ARN of a named trigger
pub fn trigger_arn(region: &str, account_id: &str, name: &str) -> String {
    format!(
        "arn:{}:glue:{region}:{account_id}:trigger/{name}",
        partition(region)
    )
}

/// Trigger name an ARN points at, if it is a trigger ARN
pub fn trigger_name(arn: &str) -> Option<&str> {
    TRIGGER_ARN
        .captures(arn)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
