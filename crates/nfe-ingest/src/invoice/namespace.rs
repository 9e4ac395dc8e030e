//! Namespace detection and qualified names.

use super::xml::{XmlDocument, XmlElement};

/// A local name with the namespace it must be bound to.
///
/// `namespace: None` matches only unqualified elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName<'a> {
    pub namespace: Option<&'a str>,
    pub local: &'a str,
}

impl QName<'_> {
    /// True when `element` has this local name and namespace.
    pub fn matches(&self, element: &XmlElement) -> bool {
        element.name == self.local && element.namespace.as_deref() == self.namespace
    }
}

/// The namespace every lookup in a document is qualified with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    uri: Option<String>,
}

impl Namespace {
    /// Reads the namespace bound to the document's root element.
    ///
    /// Producers differ in the URI they emit, so nothing is assumed; an
    /// unqualified root yields unqualified lookups.
    pub fn detect(document: &XmlDocument) -> Self {
        Self {
            uri: document.root().namespace.clone(),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Qualifies a local name with this namespace.
    pub fn qualify<'a>(&'a self, local: &'a str) -> QName<'a> {
        QName {
            namespace: self.uri(),
            local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::xml::parse_document;

    #[test]
    fn test_detect_default_namespace() {
        let doc = parse_document(r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe"/>"#)
            .unwrap();
        assert_eq!(
            Namespace::detect(&doc).uri(),
            Some("http://www.portalfiscal.inf.br/nfe")
        );
    }

    #[test]
    fn test_detect_prefixed_namespace() {
        let doc = parse_document(r#"<n:NFe xmlns:n="urn:example:nfe"><n:a/></n:NFe>"#).unwrap();
        let ns = Namespace::detect(&doc);
        assert_eq!(ns.uri(), Some("urn:example:nfe"));
        assert!(ns.qualify("a").matches(&doc.root().children[0]));
    }

    #[test]
    fn test_detect_unqualified() {
        let doc = parse_document("<NFe><ide/></NFe>").unwrap();
        let ns = Namespace::detect(&doc);
        assert_eq!(ns.uri(), None);
        assert!(ns.qualify("ide").matches(&doc.root().children[0]));
    }

    #[test]
    fn test_qualified_name_rejects_other_namespace() {
        let doc = parse_document(r#"<NFe xmlns="urn:a"><ide xmlns="urn:b"/></NFe>"#).unwrap();
        let ns = Namespace::detect(&doc);
        assert!(!ns.qualify("ide").matches(&doc.root().children[0]));
    }
}
