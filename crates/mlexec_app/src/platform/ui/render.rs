use mlexec_core::{
    AlgorithmId, AppViewModel, OutputView, GENERAL_HEADING, SPECIFIC_HEADING, TREE_IMAGE_ALT,
};

const TITLE: &str = "Machine Learning Execution";
const INPUT_HEADING: &str = "Input (CSV Content)";
const OUTPUT_HEADING: &str = "Output";

/// Full text rendering of the session: controls, input preview and output.
pub fn render(view: &AppViewModel) -> String {
    let mut lines = vec![format!("== {TITLE} ==")];

    lines.push(format!(
        "Algorithm: {}",
        view.selected
            .map(|id| format!("{} ({})", id.label(), id.tag()))
            .unwrap_or_else(|| "-- Select Code --".to_string())
    ));
    if let Some(name) = &view.file_name {
        lines.push(format!("Uploaded: {name}"));
    }
    lines.push(format!("Execute: {}", execute_status(view)));

    lines.push(String::new());
    lines.push(format!("--- {INPUT_HEADING} ---"));
    if view.preview_pending {
        lines.push("(decoding...)".to_string());
    } else {
        lines.push(view.preview.trim_end().to_string());
    }

    lines.push(String::new());
    lines.push(format!("--- {OUTPUT_HEADING} ---"));
    lines.extend(render_output_lines(&view.output));

    lines.join("\n")
}

/// Only the output panel, used by one-shot runs.
pub fn render_output_panel(output: &OutputView) -> String {
    render_output_lines(output).join("\n")
}

pub fn render_algorithms() -> String {
    AlgorithmId::ALL
        .iter()
        .map(|id| format!("{:<22} {}", id.tag(), id.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn execute_status(view: &AppViewModel) -> &'static str {
    match (view.in_flight, view.can_execute) {
        (true, _) => "running",
        (false, true) => "ready",
        (false, false) => "disabled (select a code and upload a file)",
    }
}

fn render_output_lines(output: &OutputView) -> Vec<String> {
    match output {
        OutputView::Placeholder { text } | OutputView::Notice { text } => vec![text.clone()],
        OutputView::FindS {
            message,
            hypothesis,
        } => vec![format!("{message} {hypothesis}")],
        OutputView::CandidateElimination { specific, general } => vec![
            format!("# {SPECIFIC_HEADING}"),
            specific.clone(),
            format!("# {GENERAL_HEADING}"),
            general.clone(),
        ],
        OutputView::Id3 { heading, image_ref } => vec![
            format!("# {heading}"),
            match image_ref {
                Some(reference) => format!("[{TREE_IMAGE_ALT}] {reference}"),
                None => format!("[{TREE_IMAGE_ALT}] (no image)"),
            },
        ],
        OutputView::Unrecognized => vec!["(output not recognised for this algorithm)".to_string()],
    }
}
