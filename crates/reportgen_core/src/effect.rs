#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitPipeline {
        request_id: crate::RequestId,
        file: crate::FileDescriptor,
        topic: String,
    },
    CancelPipeline {
        request_id: crate::RequestId,
    },
    SaveArtifact(crate::Artifact),
    /// A selected file failed validation; state was left as it was.
    FileRejected(crate::ValidationError),
}
