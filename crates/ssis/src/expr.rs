//! Expression-language reference scanning: `@[User::X]`, `@[System::X]`,
//! `$Project::X`, `$Package::X` (C4 step 4 and connection pre-pass).

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionRefs {
    pub variables: Vec<String>,
    pub parameters: Vec<String>,
}

fn variable_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@\[(?:User|System)::([A-Za-z0-9_]+)\]").unwrap())
}

fn project_param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(?:Project|Package)::([A-Za-z0-9_]+)").unwrap())
}

/// Scans `text` (an expression, SQL statement, or connection string) for
/// embedded variable/parameter references.
pub fn scan(text: &str) -> ExpressionRefs {
    let mut refs = ExpressionRefs::default();
    for caps in variable_ref_re().captures_iter(text) {
        refs.variables.push(caps[1].to_string());
    }
    for caps in project_param_re().captures_iter(text) {
        refs.parameters.push(caps[1].to_string());
    }
    refs.variables.sort();
    refs.variables.dedup();
    refs.parameters.sort();
    refs.parameters.dedup();
    refs
}
