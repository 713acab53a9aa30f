//! Identity Cross-Checker: flags when the profile owner and the GitHub account
//! look like different people.

use serde::Serialize;

/// Shared tokens must be longer than this to count as the same name.
const MIN_SHARED_TOKEN_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameComparison {
    #[serde(rename = "match")]
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl NameComparison {
    fn matched() -> Self {
        Self {
            is_match: true,
            warning: None,
        }
    }
}

/// Compares the profile-derived name with the GitHub display name.
///
/// A missing name on either side is a match: there is nothing to contradict.
pub fn compare_names(linkedin_name: Option<&str>, github_name: Option<&str>) -> NameComparison {
    let (Some(linked), Some(git)) = (
        linkedin_name.filter(|n| !n.is_empty()),
        github_name.filter(|n| !n.is_empty()),
    ) else {
        return NameComparison::matched();
    };

    let linked_norm = letters_only(linked);
    let git_norm = letters_only(git);
    if linked_norm.contains(&git_norm) || git_norm.contains(&linked_norm) {
        return NameComparison::matched();
    }

    let linked_lower = linked.to_lowercase();
    let git_lower = git.to_lowercase();
    let shares_token = linked_lower.split_whitespace().any(|lp| {
        lp.chars().count() > MIN_SHARED_TOKEN_CHARS && git_lower.split_whitespace().any(|gp| gp == lp)
    });
    if shares_token {
        return NameComparison::matched();
    }

    NameComparison {
        is_match: false,
        warning: Some(format!(
            "GitHub profile name \"{git}\" doesn't match LinkedIn name \"{linked}\". Please verify you're using the correct accounts."
        )),
    }
}

fn letters_only(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}
