//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left as is. An unset variable without a default is an
/// error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand an optional value, keeping `None` as is.
pub(crate) fn expand_opt(value: Option<&str>, field: &str) -> Result<Option<String>, ConfigError> {
    value.map(|v| expand_env(v, field)).transpose()
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_expansion_needed() {
        assert_eq!(expand_env("plain.css", "f").unwrap(), "plain.css");
    }

    #[test]
    fn test_bare_dollar_is_kept() {
        assert_eq!(expand_env("$HOME/x", "f").unwrap(), "$HOME/x");
    }

    #[test]
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MAMD_TEST_THEME_DIR", "/themes");
        }
        let result = expand_env("${MAMD_TEST_THEME_DIR}/page.html", "site.template").unwrap();
        assert_eq!(result, "/themes/page.html");
        unsafe {
            std::env::remove_var("MAMD_TEST_THEME_DIR");
        }
    }

    #[test]
    fn test_expand_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MAMD_TEST_UNSET_STYLE");
        }
        let result = expand_env("${MAMD_TEST_UNSET_STYLE:-github}", "highlight.style").unwrap();
        assert_eq!(result, "github");
    }

    #[test]
    fn test_unset_var_is_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MAMD_TEST_MISSING");
        }
        let err = expand_env("${MAMD_TEST_MISSING}", "site.stylesheet").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in site.stylesheet: ${MAMD_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_expand_opt_none() {
        assert_eq!(expand_opt(None, "f").unwrap(), None);
    }
}
