//! Report Extraction
//!
//! Derives the caller-facing analysis from a finished transcript. Never fails.

use serde::{Deserialize, Serialize};

use crate::agent::{ParticipantId, Transcript};

const PROBLEM_MARKER: &str = "### Problem";
const CAUSE_MARKER: &str = "### Root Cause";
const SOLUTION_MARKER: &str = "### Solution";

const PROBLEM_PREFIX: &str = "problem:";
const CAUSE_PREFIX: &str = "cause of problem:";
const SOLUTION_PREFIX: &str = "solution:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub problem: String,
    pub cause: String,
    pub solution: String,
}

impl AnalysisResult {
    /// Replace empty fields with an explicit placeholder
    pub fn normalized(mut self) -> Self {
        for (field, value) in [
            ("problem", &mut self.problem),
            ("cause", &mut self.cause),
            ("solution", &mut self.solution),
        ] {
            let trimmed = value.trim();
            *value = if trimmed.is_empty() {
                placeholder(field)
            } else {
                trimmed.to_string()
            };
        }
        self
    }
}

fn placeholder(field: &str) -> String {
    format!("No {} information available", field)
}

/// Extract problem, cause and solution from the transcript
pub fn extract(transcript: &Transcript) -> AnalysisResult {
    if let Some(result) = transcript
        .last_authored_by(ParticipantId::Summarizer)
        .and_then(|m| parse_marked_sections(&m.content))
    {
        return result.normalized();
    }

    let source = transcript
        .last_agent_message()
        .or_else(|| transcript.last());

    let Some(source) = source else {
        return AnalysisResult::default().normalized();
    };

    if let Some(result) = parse_prefixed_lines(&source.content) {
        return result.normalized();
    }

    // No markers anywhere: hand back the raw text as the solution
    let raw = transcript.last().map(|m| m.content.clone()).unwrap_or_default();
    AnalysisResult {
        problem: String::new(),
        cause: String::new(),
        solution: raw,
    }
    .normalized()
}

/// Parse `### Problem` / `### Root Cause` / `### Solution` sections
fn parse_marked_sections(content: &str) -> Option<AnalysisResult> {
    let mut found: Vec<(usize, &str)> = [PROBLEM_MARKER, CAUSE_MARKER, SOLUTION_MARKER]
        .iter()
        .filter_map(|marker| content.find(marker).map(|pos| (pos, *marker)))
        .collect();

    if found.is_empty() {
        return None;
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut result = AnalysisResult::default();
    for (idx, (pos, marker)) in found.iter().enumerate() {
        let start = pos + marker.len();
        let end = found
            .get(idx + 1)
            .map(|(next, _)| *next)
            .unwrap_or(content.len());
        let text = content[start..end].trim().to_string();

        match *marker {
            PROBLEM_MARKER => result.problem = text,
            CAUSE_MARKER => result.cause = text,
            _ => result.solution = text,
        }
    }

    Some(result)
}

#[derive(Clone, Copy)]
enum Section {
    Problem,
    Cause,
    Solution,
}

/// Line-oriented accumulator over `problem:` / `cause of problem:` / `solution:` prefixes
fn parse_prefixed_lines(content: &str) -> Option<AnalysisResult> {
    let mut result = AnalysisResult::default();
    let mut current: Option<Section> = None;

    for line in content.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();

        let started = [
            (PROBLEM_PREFIX, Section::Problem),
            (CAUSE_PREFIX, Section::Cause),
            (SOLUTION_PREFIX, Section::Solution),
        ]
        .into_iter()
        .find(|(prefix, _)| lower.starts_with(prefix));

        if let Some((prefix, section)) = started {
            current = Some(section);
            let rest = line.get(prefix.len()..).unwrap_or("");
            *field_mut(&mut result, section) = rest.trim().to_string();
            continue;
        }

        if let Some(section) = current {
            if !line.is_empty() {
                let field = field_mut(&mut result, section);
                if !field.is_empty() {
                    field.push(' ');
                }
                field.push_str(line);
            }
        }
    }

    current.map(|_| result)
}

fn field_mut(result: &mut AnalysisResult, section: Section) -> &mut String {
    match section {
        Section::Problem => &mut result.problem,
        Section::Cause => &mut result.cause,
        Section::Solution => &mut result.solution,
    }
}
