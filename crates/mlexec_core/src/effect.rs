#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    DecodePreview {
        generation: crate::Generation,
        file: crate::UploadedFile,
    },
    SubmitExecution {
        request_id: crate::RequestId,
        submission: crate::SubmissionRecord,
    },
}
