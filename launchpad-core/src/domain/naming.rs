//! Resource naming rules
//!
//! A deployment name ends up in a file name, an image repository path and
//! cluster object names. The cluster is the strictest of the three, so the
//! cluster rule is the one checked here.

/// Longest name the cluster accepts for a DNS-1123 label
pub const MAX_RESOURCE_NAME_LEN: usize = 63;

/// Suffix appended to a deployment name to form its job name
pub const JOB_NAME_SUFFIX: &str = "-job";

/// Derives the job name for a deployment
pub fn job_name_for(deployment_name: &str) -> String {
    format!("{}{}", deployment_name, JOB_NAME_SUFFIX)
}

/// Checks a name against the cluster's DNS-1123 label rule
///
/// Lowercase ASCII alphanumerics and `-` only, 1 to 63 characters, starting
/// and ending with an alphanumeric.
pub fn validate_resource_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }

    if name.len() > MAX_RESOURCE_NAME_LEN {
        return Err(format!(
            "name '{}' is {} characters long, maximum is {}",
            name,
            name.len(),
            MAX_RESOURCE_NAME_LEN
        ));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(format!(
            "name '{}' contains invalid character '{}': only lowercase alphanumerics and '-' are allowed",
            name, bad
        ));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(format!(
            "name '{}' must start and end with an alphanumeric character",
            name
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_name_for() {
        assert_eq!(job_name_for("hello"), "hello-job");
    }

    #[test]
    fn test_valid_names() {
        for name in ["a", "hello", "hello-world", "app-2", "0abc"] {
            assert!(validate_resource_name(name).is_ok(), "{name}");
        }
        assert!(validate_resource_name(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "Hello", "hello_world", "-hello", "hello-", "he llo", "héllo"] {
            assert!(validate_resource_name(name).is_err(), "{name:?}");
        }
        assert!(validate_resource_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_error_names_offending_character() {
        let err = validate_resource_name("my_app").unwrap_err();
        assert!(err.contains('_'));
    }
}
