//! Branch naming convention: `<initials>-<project>-<ticket>-<descriptor>`.
//!
//! [`is_main`] is the sole authority for trunk detection. Every other module
//! calls through it instead of comparing strings itself, so the comparison
//! rule (exact equality) cannot drift between call sites.

use std::fmt;

use regex::Regex;

use crate::config::Config;
use crate::error::NameError;

/// A validated feature-branch name. Constructed transiently during branch
/// creation; git remains the source of truth for existing names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName {
    pub initials: String,
    pub project: String,
    pub ticket: Option<String>,
    pub descriptor: String,
}

impl BranchName {
    /// Validate the pieces of a branch name against configuration.
    pub fn parse(
        initials: &str,
        project: &str,
        ticket: Option<&str>,
        descriptor: &str,
        config: &Config,
    ) -> Result<Self, NameError> {
        let project = project.trim().to_lowercase();
        if !config.projects.contains(&project) {
            return Err(NameError::InvalidProject {
                project,
                expected: config.projects.join(", "),
            });
        }

        let ticketless = config.ticketless_project.as_deref() == Some(project.as_str());
        let ticket = match ticket.map(str::trim) {
            Some(t) if !t.is_empty() => {
                if !t.chars().all(|c| c.is_ascii_digit()) {
                    return Err(NameError::InvalidTicket {
                        ticket: t.to_string(),
                    });
                }
                Some(t.to_string())
            }
            _ if ticketless => None,
            Some(t) => {
                return Err(NameError::InvalidTicket {
                    ticket: t.to_string(),
                })
            }
            None => {
                return Err(NameError::InvalidTicket {
                    ticket: String::new(),
                })
            }
        };

        let descriptor = descriptor.trim().replace(' ', "-");
        if descriptor.is_empty() {
            return Err(NameError::EmptyDescriptor);
        }

        Ok(Self {
            initials: initials.trim().to_lowercase(),
            project,
            ticket,
            descriptor,
        })
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ticket {
            Some(ticket) => write!(
                f,
                "{}-{}-{}-{}",
                self.initials, self.project, ticket, self.descriptor
            ),
            None => write!(f, "{}-{}-{}", self.initials, self.project, self.descriptor),
        }
    }
}

/// Whether `name` is the configured trunk branch. Exact, case-sensitive.
pub fn is_main(name: &str, config: &Config) -> bool {
    name == config.main_branch
}

/// Whether `name` follows the branch naming convention. The trunk branch
/// itself never matches.
pub fn matches_convention(name: &str, config: &Config) -> bool {
    if is_main(name, config) {
        return false;
    }

    let initials = regex::escape(&config.dev_initials);
    let projects = config
        .projects
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");

    let ticketed = format!(r"^(?i){initials}-({projects})-\d+(-[a-zA-Z0-9]+)+$");
    if Regex::new(&ticketed).map_or(false, |re| re.is_match(name)) {
        return true;
    }

    if let Some(ticketless) = &config.ticketless_project {
        let tp = regex::escape(ticketless);
        let pattern = format!(r"^(?i){initials}-{tp}(-[a-zA-Z0-9]+)+$");
        return Regex::new(&pattern).map_or(false, |re| re.is_match(name));
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_parse_round_trips_to_hyphenated_form() {
        let config = test_config();
        let name = BranchName::parse("JD", "Checkin", Some("123"), "fix login", &config).unwrap();
        assert_eq!(name.to_string(), "jd-checkin-123-fix-login");
        assert!(matches_convention(&name.to_string(), &config));
    }

    #[test]
    fn test_parse_rejects_unknown_project() {
        let config = test_config();
        let err = BranchName::parse("jd", "payments", Some("1"), "x", &config).unwrap_err();
        assert!(matches!(err, NameError::InvalidProject { .. }));
    }

    #[test]
    fn test_parse_rejects_non_numeric_ticket() {
        let config = test_config();
        let err = BranchName::parse("jd", "checkin", Some("12a"), "x", &config).unwrap_err();
        assert!(matches!(err, NameError::InvalidTicket { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_ticket_for_ticketed_project() {
        let config = test_config();
        let err = BranchName::parse("jd", "checkin", None, "x", &config).unwrap_err();
        assert!(matches!(err, NameError::InvalidTicket { .. }));
    }

    #[test]
    fn test_ticketless_project_allows_absent_ticket() {
        let config = test_config();
        let name = BranchName::parse("jd", "portal", None, "landing page", &config).unwrap();
        assert_eq!(name.to_string(), "jd-portal-landing-page");
        assert!(matches_convention(&name.to_string(), &config));
    }

    #[test]
    fn test_parse_rejects_blank_descriptor() {
        let config = test_config();
        let err = BranchName::parse("jd", "checkin", Some("1"), "   ", &config).unwrap_err();
        assert_eq!(err, NameError::EmptyDescriptor);
    }

    #[test]
    fn test_convention_is_case_insensitive() {
        let config = test_config();
        assert!(matches_convention("JD-Checkin-42-Fix-Bug", &config));
    }

    #[test]
    fn test_convention_rejects_non_matching_names() {
        let config = test_config();
        for name in [
            "feature/login",
            "jd-payments-1-x",
            "xx-checkin-1-fix",
            "jd-checkin-abc-fix",
            "jd-checkin-1-",
            "",
        ] {
            assert!(!matches_convention(name, &config), "matched: {name}");
        }
    }

    #[test]
    fn test_convention_rejects_main_itself() {
        let mut config = test_config();
        assert!(!matches_convention("main", &config));

        // Even a trunk named like a feature branch must not match.
        config.main_branch = "jd-checkin-1-trunk".to_string();
        assert!(!matches_convention("jd-checkin-1-trunk", &config));
    }

    #[test]
    fn test_is_main_is_exact_and_case_sensitive() {
        let config = test_config();
        assert!(is_main("main", &config));
        assert!(!is_main("Main", &config));
        assert!(!is_main("main ", &config));
        assert!(!is_main("mainline", &config));
    }

    // Regression guard: the exact-equality rule and the convention regex must
    // agree that main is never a feature branch, for every input tried.
    #[test]
    fn test_main_detection_is_consistent() {
        let config = test_config();
        for name in ["main", "mainline", "jd-checkin-1-main", "Main"] {
            if is_main(name, &config) {
                assert!(!matches_convention(name, &config));
            }
        }
    }
}
