//! Stage progress reporting for long pipeline runs.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CheckingCache,
    ReadingMesh,
    ExtractingPeaks { run_id: String },
    Aggregating,
    Sorting,
    Fitting,
    Predicting,
    Materializing,
    SavingResults,
    Completed,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::LoadingProject => write!(f, "loading project"),
            RunStage::CheckingCache => write!(f, "checking cache"),
            RunStage::ReadingMesh => write!(f, "reading mesh"),
            RunStage::ExtractingPeaks { run_id } => write!(f, "extracting peaks ({run_id})"),
            RunStage::Aggregating => write!(f, "aggregating annual maxima"),
            RunStage::Sorting => write!(f, "sorting samples"),
            RunStage::Fitting => write!(f, "fitting GEV per node"),
            RunStage::Predicting => write!(f, "predicting return periods"),
            RunStage::Materializing => write!(f, "materializing results"),
            RunStage::SavingResults => write!(f, "saving results"),
            RunStage::Completed => write!(f, "completed"),
        }
    }
}
