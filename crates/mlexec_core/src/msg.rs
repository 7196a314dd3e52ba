#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked an algorithm.
    AlgorithmSelected(crate::AlgorithmId),
    /// File picker closed; `None` when the dialog was cancelled.
    FilePicked(Option<crate::UploadedFile>),
    /// Engine finished decoding a picked file to text.
    PreviewDecoded {
        generation: crate::Generation,
        result: Result<String, String>,
    },
    /// User clicked Execute.
    ExecuteClicked,
    /// Engine completion for a submission.
    ExecutionFinished {
        request_id: crate::RequestId,
        outcome: crate::ExecutionOutcome,
    },
}
