//! Script task analysis (C4 step 3, Script task branch).

use crate::xmltree::XmlElement;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    VbNet,
    CSharp,
    Unknown,
}

impl ScriptLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptLanguage::VbNet => "VB.NET",
            ScriptLanguage::CSharp => "C#",
            ScriptLanguage::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptAnalysis {
    pub language: Option<&'static str>,
    pub vsta_version: Option<String>,
    pub entry_point: Option<String>,
    pub read_only_variables: Vec<String>,
    pub read_write_variables: Vec<String>,
    pub complexity: &'static str,
    pub frameworks: Vec<&'static str>,
}

fn source_container_candidates() -> &'static [&'static str] {
    &["ScriptCode", "SourceCode", "VSTAScriptProjectStorage", "ScriptCode"]
}

fn main_sub_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:Sub\s+Main|void\s+Main)\b").unwrap())
}

/// Scans the sub-tree for known script-storage containers, falling back to
/// CDATA text and a `Sub Main|void Main` pattern match.
fn extract_source(task: &XmlElement) -> Option<String> {
    for container in source_container_candidates() {
        if let Some(elem) = task.find_descendant(container) {
            if !elem.text.trim().is_empty() {
                return Some(elem.text.clone());
            }
        }
    }
    find_main_in_subtree(task)
}

fn find_main_in_subtree(elem: &XmlElement) -> Option<String> {
    if main_sub_re().is_match(&elem.text) {
        return Some(elem.text.clone());
    }
    for child in &elem.children {
        if let Some(found) = find_main_in_subtree(child) {
            return Some(found);
        }
    }
    None
}

fn detect_language(source: &str) -> ScriptLanguage {
    if main_sub_re().is_match(source) && source.contains("void Main") {
        ScriptLanguage::CSharp
    } else if source.contains("Sub Main") {
        ScriptLanguage::VbNet
    } else {
        ScriptLanguage::Unknown
    }
}

/// Weighted keyword scan: loops/conditionals/exception handling raise the
/// score; more than a handful pushes a script from `low` to `medium` to
/// `high`.
fn score_complexity(source: &str) -> Complexity {
    let weights: &[(&str, u32)] = &[
        ("For ", 2),
        ("While ", 2),
        ("Do ", 2),
        ("for (", 2),
        ("while (", 2),
        ("If ", 1),
        ("if (", 1),
        ("Try", 3),
        ("try", 3),
        ("Catch", 3),
        ("catch", 3),
        ("Select Case", 2),
        ("switch", 2),
    ];
    let score: u32 = weights
        .iter()
        .map(|(kw, w)| source.matches(kw).count() as u32 * w)
        .sum();
    if score >= 15 {
        Complexity::High
    } else if score >= 5 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

fn detect_frameworks(source: &str) -> Vec<&'static str> {
    let mut frameworks = Vec::new();
    if source.contains("Dts.Variables") || source.contains("Dts.TaskResult") {
        frameworks.push("ssis_variables");
    }
    if source.contains("System.Data.SqlClient") || source.contains("SqlConnection") {
        frameworks.push("ado_net");
    }
    if source.contains("System.IO") {
        frameworks.push("file_system");
    }
    if source.contains("HttpClient") || source.contains("WebRequest") {
        frameworks.push("http");
    }
    frameworks
}

pub fn analyze_script_task(task: &XmlElement) -> ScriptAnalysis {
    let object_data = task.find_descendant("ObjectData");
    let script_data = object_data.and_then(|od| od.find_descendant("ScriptTaskData"));

    let vsta_version = script_data
        .and_then(|d| d.attr("VSTAMAJORVERSION").or_else(|| d.attr("VSTAMajorVersion")))
        .map(str::to_string);
    let entry_point = script_data
        .and_then(|d| d.attr("ScriptEntryPoint"))
        .map(str::to_string);
    let read_only_variables = script_data
        .and_then(|d| d.attr("ReadOnlyVariables"))
        .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let read_write_variables = script_data
        .and_then(|d| d.attr("ReadWriteVariables"))
        .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let source = extract_source(task).unwrap_or_default();
    let language = if source.is_empty() {
        None
    } else {
        Some(detect_language(&source).as_str())
    };
    let complexity = score_complexity(&source).as_str();
    let frameworks = detect_frameworks(&source);

    ScriptAnalysis {
        language,
        vsta_version,
        entry_point,
        read_only_variables,
        read_write_variables,
        complexity,
        frameworks,
    }
}
