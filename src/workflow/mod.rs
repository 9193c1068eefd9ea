pub mod advisor;
pub mod analysis;
pub mod drafting;
pub mod transform;

pub use advisor::{AdvisorReply, AdvisorTask};
pub use analysis::{parse_analysis, AnalysisTask};
pub use drafting::DraftingTask;
pub use transform::{TransformKind, TransformOutcome, TransformTask};
