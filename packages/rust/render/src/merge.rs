//! Concatenation of intermediate PDFs into the final document.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

use docbinder_shared::{DocBinderError, Result};

/// Page attributes a page may inherit from its `Pages` ancestors.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Merge `inputs` in order into a single PDF at `output`.
///
/// Returns the number of pages written. On a save failure the partially
/// written output is removed.
#[instrument(skip_all, fields(inputs = inputs.len(), output = %output.display()))]
pub fn merge_documents(inputs: &[PathBuf], output: &Path) -> Result<usize> {
    if inputs.is_empty() {
        return Err(DocBinderError::Merge("no intermediate documents to merge".into()));
    }

    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects = std::collections::BTreeMap::new();

    for path in inputs {
        let mut doc = Document::load(path)
            .map_err(|e| DocBinderError::Merge(format!("cannot load {}: {e}", path.display())))?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let before = pages.len();
        for (_, page_id) in doc.get_pages() {
            let mut page = doc
                .get_dictionary(page_id)
                .map_err(|e| {
                    DocBinderError::Merge(format!("bad page in {}: {e}", path.display()))
                })?
                .clone();
            inherit_attributes(&doc, &mut page);
            pages.push((page_id, page));
        }
        debug!(path = %path.display(), pages = pages.len() - before, "loaded intermediate");

        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut pages_root: Option<(ObjectId, Dictionary)> = None;

    for (id, object) in objects {
        match object.type_name().unwrap_or(b"") {
            b"Catalog" => {
                if catalog.is_none() {
                    if let Ok(dict) = object.as_dict() {
                        catalog = Some((id, dict.clone()));
                    }
                }
            }
            b"Pages" => {
                if let Ok(dict) = object.as_dict() {
                    match &mut pages_root {
                        Some((_, root)) => root.extend(dict),
                        None => pages_root = Some((id, dict.clone())),
                    }
                }
            }
            // Rebuilt below; outlines are dropped.
            b"Page" | b"Outlines" | b"Outline" => {}
            _ => {
                merged.objects.insert(id, object);
            }
        }
    }

    let (pages_id, mut pages_dict) = pages_root
        .ok_or_else(|| DocBinderError::Merge("no page tree found in intermediates".into()))?;
    let (catalog_id, mut catalog_dict) = catalog
        .ok_or_else(|| DocBinderError::Merge("no document catalog found in intermediates".into()))?;

    let page_count = pages.len();
    let mut kids = Vec::with_capacity(page_count);
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        merged.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    pages_dict.set("Count", page_count as i64);
    pages_dict.set("Kids", kids);
    pages_dict.remove(b"Parent");
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

    catalog_dict.set("Pages", pages_id);
    catalog_dict.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog_dict));

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.keys().map(|(n, _)| *n).max().unwrap_or(0);
    merged.renumber_objects();
    merged.compress();

    if let Err(e) = merged.save(output) {
        if output.exists() {
            if let Err(rm) = std::fs::remove_file(output) {
                warn!(error = %rm, "failed to remove partial output");
            }
        }
        return Err(DocBinderError::Merge(format!(
            "cannot write {}: {e}",
            output.display()
        )));
    }

    info!(pages = page_count, "merged document written");
    Ok(page_count)
}

/// Copy attributes inherited through the page tree onto the page itself,
/// since the page is about to get a new parent.
fn inherit_attributes(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(id) = parent {
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}
