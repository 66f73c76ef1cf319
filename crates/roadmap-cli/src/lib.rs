//! # roadmap-cli
//!
//! Library side of the `roadmap` binary: configuration loading, diagnostic
//! output and the editor server.

pub mod config;
pub mod diagnostics;
pub mod server;

/// Sample document written by `roadmap init`
pub const SAMPLE_ROADMAP: &str = include_str!("../assets/sample_roadmap.json");

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_core::{has_errors, validate, Document};

    #[test]
    fn sample_document_is_valid() {
        let doc = Document::from_json_str(SAMPLE_ROADMAP).unwrap();
        assert_eq!(doc.products.len(), 5);
        assert_eq!(doc.material_systems.len(), 3);
        assert_eq!(doc.opportunities.len(), 4);
        assert_eq!(doc.suppliers.len(), 3);
        let diagnostics = validate(&doc);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert!(!has_errors(&diagnostics));
    }
}
