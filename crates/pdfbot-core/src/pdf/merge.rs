use base64::{Engine as _, engine::general_purpose::STANDARD};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed `Parent` cycles
const MAX_TREE_DEPTH: usize = 64;

/// Combined output of a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedPdf {
    bytes: Vec<u8>,
    document_count: usize,
}

impl MergedPdf {
    pub const fn new(bytes: Vec<u8>, document_count: usize) -> Self {
        Self {
            bytes,
            document_count,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of source documents merged
    pub const fn document_count(&self) -> usize {
        self.document_count
    }

    /// Standard padded base64 of the PDF bytes
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Number of pages in a PDF
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| Error::PdfMerge(format!("Failed to load document: {e}")))?;
    Ok(doc.get_pages().len())
}

/// Merge documents by appending every page of each input, in input order.
///
/// Any unparsable input aborts the whole merge. A single input is validated
/// and returned unchanged.
pub fn merge_pdfs<B: AsRef<[u8]>>(documents: &[B]) -> Result<Vec<u8>> {
    if documents.is_empty() {
        return Err(Error::PdfMerge("no documents to merge".to_string()));
    }

    if let [only] = documents {
        load(only.as_ref(), 0)?;
        return Ok(only.as_ref().to_vec());
    }

    let mut max_id: u32 = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut merged = Document::with_version("1.5");

    for (i, bytes) in documents.iter().enumerate() {
        let mut doc = load(bytes.as_ref(), i)?;

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by page number, so this walks pages in reading order
        for page_id in doc.get_pages().into_values() {
            pages.push((page_id, page_with_inherited_attributes(&doc, page_id)?));
        }

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline" => {}
                _ => {
                    merged.objects.insert(object_id, object);
                }
            }
        }
    }

    merged.max_id = max_id;
    let pages_id = merged.new_object_id();

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let total_pages = i64::try_from(kids.len())
        .map_err(|_| Error::PdfMerge("too many pages".to_string()))?;

    for (page_id, mut page) in pages {
        page.set("Parent", Object::Reference(pages_id));
        merged.objects.insert(page_id, Object::Dictionary(page));
    }

    let pages_dict = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(total_pages)),
    ]);
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = merged.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    merged.renumber_objects();
    merged.compress();

    let mut output = Vec::new();
    merged
        .save_to(&mut output)
        .map_err(|e| Error::PdfMerge(format!("Failed to save merged PDF: {e}")))?;

    Ok(output)
}

fn load(bytes: &[u8], index: usize) -> Result<Document> {
    Document::load_mem(bytes)
        .map_err(|e| Error::PdfMerge(format!("Failed to load document {}: {e}", index + 1)))
}

/// Copy of a page dictionary with inherited attributes made explicit.
///
/// Source page tree nodes are dropped during a merge, so anything a page
/// picked up from them has to move onto the page itself.
fn page_with_inherited_attributes(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfMerge(format!("Invalid page object {page_id:?}: {e}")))?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };

        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Ok(value) = node.get(key)
            {
                page.set(key, value.clone());
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

// =============================================================================
// Tests
// =============================================================================
