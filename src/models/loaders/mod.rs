pub mod document_loader;

pub use document_loader::{load_document, load_documents_from_folder};
