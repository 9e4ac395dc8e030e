//! NF-e invoice documents.
//!
//! Parsing happens in two steps: the XML text is read into an owned element
//! tree with every element's namespace resolved, and the line extractor
//! queries that tree with names qualified by the namespace detected on the
//! root element.

mod extract;
mod namespace;
mod xml;

pub use extract::{ContributionTax, extract_invoice_lines, parse_invoice, read_invoice_file};
pub use namespace::{Namespace, QName};
pub use xml::{MAX_DEPTH, XmlDocument, XmlElement, parse_document};
