//! Maps a submitted algorithm and its result onto a view.
//!
//! Payload fields are looked up leniently: anything missing renders as an
//! empty fragment rather than an error.

use serde::Serialize;
use serde_json::Value;

use crate::{AlgorithmId, ExecutionResult, SubmissionRecord};

pub const NO_OUTPUT_PLACEHOLDER: &str = "No output yet.";
pub const SPECIFIC_HEADING: &str = "Specific Hypothesis";
pub const GENERAL_HEADING: &str = "General Hypotheses";
pub const TREE_IMAGE_ALT: &str = "Decision Tree";

/// Which rendering strategy applies to the current result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKey {
    FindS,
    CandidateElimination,
    Id3,
    Unknown,
}

impl From<AlgorithmId> for RenderKey {
    fn from(algorithm: AlgorithmId) -> Self {
        match algorithm {
            AlgorithmId::FindS => RenderKey::FindS,
            AlgorithmId::CandidateElimination => RenderKey::CandidateElimination,
            AlgorithmId::Id3 => RenderKey::Id3,
        }
    }
}

impl From<Option<&SubmissionRecord>> for RenderKey {
    fn from(record: Option<&SubmissionRecord>) -> Self {
        record.map_or(RenderKey::Unknown, |record| record.algorithm.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OutputView {
    Placeholder {
        text: String,
    },
    Notice {
        text: String,
    },
    FindS {
        message: String,
        hypothesis: String,
    },
    CandidateElimination {
        specific: String,
        general: String,
    },
    Id3 {
        heading: String,
        image_ref: Option<String>,
    },
    /// A payload arrived with no submission to interpret it against.
    Unrecognized,
}

pub fn render_output(
    key: RenderKey,
    result: Option<&ExecutionResult>,
    origin: &str,
) -> OutputView {
    let payload = match result {
        None => {
            return OutputView::Placeholder {
                text: NO_OUTPUT_PLACEHOLDER.to_string(),
            }
        }
        Some(ExecutionResult::Notice(text)) => return OutputView::Notice { text: text.clone() },
        Some(ExecutionResult::Payload(payload)) => payload,
    };

    match key {
        RenderKey::FindS => OutputView::FindS {
            message: serialized_field(payload, "message"),
            hypothesis: serialized_field(payload, "hypothesis"),
        },
        RenderKey::CandidateElimination => OutputView::CandidateElimination {
            specific: serialized_field(payload, SPECIFIC_HEADING),
            general: serialized_field(payload, GENERAL_HEADING),
        },
        RenderKey::Id3 => OutputView::Id3 {
            heading: text_field(payload, "message"),
            image_ref: payload
                .get("image_url")
                .and_then(Value::as_str)
                .map(|path| image_reference(origin, path)),
        },
        RenderKey::Unknown => OutputView::Unrecognized,
    }
}

/// Joins the backend origin and a server-relative path.
pub fn image_reference(origin: &str, path: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), path)
}

fn serialized_field(payload: &Value, field: &str) -> String {
    payload
        .get(field)
        .and_then(|value| serde_json::to_string(value).ok())
        .unwrap_or_default()
}

fn text_field(payload: &Value, field: &str) -> String {
    match payload.get(field) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
