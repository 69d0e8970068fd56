//! Page geometry read straight from the PDF object tree with lopdf

use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use pdf_view_runtime::{DocumentSource, PageSize};
use std::sync::Arc;

/// Inheritance chains deeper than this are treated as malformed
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Read the raw bytes of a document source
pub async fn read_source(source: &DocumentSource) -> Result<Arc<[u8]>> {
    match source {
        DocumentSource::Path(path) => Ok(tokio::fs::read(path).await?.into()),
        DocumentSource::Bytes(bytes) => Ok(Arc::clone(bytes)),
    }
}

/// Page count and native page sizes, without a rendering library
pub async fn inspect(source: &DocumentSource) -> Result<Vec<PageSize>> {
    let bytes = read_source(source).await?;
    tokio::task::spawn_blocking(move || {
        let doc = Document::load_mem(&bytes)?;
        page_sizes(&doc)
    })
    .await?
}

/// Native size of every page of an already parsed document
pub fn page_sizes(doc: &Document) -> Result<Vec<PageSize>> {
    doc.get_pages()
        .values()
        .map(|&page_id| page_size(doc, page_id))
        .collect()
}

fn page_size(doc: &Document, page_id: ObjectId) -> Result<PageSize> {
    // Visible area is the CropBox when one is set
    let visible = match box_size(doc, page_id, b"CropBox")? {
        Some(size) => size,
        None => box_size(doc, page_id, b"MediaBox")?.unwrap_or_else(PageSize::letter),
    };

    let rotation = inherited(doc, page_id, b"Rotate")?
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    if rotation.rem_euclid(180) == 90 {
        Ok(PageSize::new(visible.height, visible.width))
    } else {
        Ok(visible)
    }
}

fn box_size(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<PageSize>> {
    Ok(inherited(doc, page_id, key)?
        .and_then(|obj| rect_from_object(doc, obj))
        .map(|[x0, y0, x1, y1]| PageSize::new((x1 - x0).abs(), (y1 - y0).abs()))
        .filter(|size| size.width > 0.0 && size.height > 0.0))
}

/// Look up an inheritable page attribute, walking up through `/Parent`
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Result<Option<&'a Object>> {
    let mut dict: &Dictionary = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => dict = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn rect_from_object(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values = obj.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = number(value)?;
    }
    Some(rect)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
