pub mod analysis;
pub mod chat;
pub mod document;
pub mod loaders;
pub mod section;
pub mod session;

pub use analysis::{analysis_schema, AnalysisResult, Checklist};
pub use chat::{ChatRole, ChatTurn};
pub use document::{ContentPart, DocumentKind, SourceDocument, PDF_MIME_TYPE};
pub use loaders::{load_document, load_documents_from_folder};
pub use section::{ManuscriptSection, SectionKind, SectionStatus};
pub use session::{Commit, SessionState};
