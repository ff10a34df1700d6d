//! Document loading, saving, and page inspection.

use lopdf::{Document, Object, ObjectId};

use crate::error::PdfError;

pub fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))
}

pub fn save(doc: &mut Document) -> Result<Vec<u8>, PdfError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(buffer)
}

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<usize, PdfError> {
    Ok(load(bytes)?.get_pages().len())
}

/// Page object ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Page size in points, from the page's MediaBox or the nearest ancestor
/// carrying one (MediaBox is inheritable through the page tree).
pub fn page_size(doc: &Document, page_id: ObjectId) -> Result<(f64, f64), PdfError> {
    let media_box = find_media_box(doc, page_id)?;
    if media_box.len() != 4 {
        return Err(PdfError::Malformed(format!(
            "MediaBox has {} entries, expected 4",
            media_box.len()
        )));
    }
    let coords: Vec<f64> = media_box
        .iter()
        .map(|obj| match obj {
            Object::Integer(v) => Ok(*v as f64),
            Object::Real(v) => Ok(*v as f64),
            other => Err(PdfError::Malformed(format!(
                "non-numeric MediaBox entry: {:?}",
                other
            ))),
        })
        .collect::<Result<_, _>>()?;
    Ok((coords[2] - coords[0], coords[3] - coords[1]))
}

fn find_media_box(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, PdfError> {
    let mut current = page_id;
    // Bounded walk up the Parent chain; real page trees are shallow.
    for _ in 0..32 {
        let dict = doc
            .get_object(current)
            .and_then(Object::as_dict)
            .map_err(|e| PdfError::Malformed(format!("page object {:?}: {}", current, e)))?;

        if let Ok(Object::Array(media_box)) = dict.get(b"MediaBox") {
            return Ok(media_box.clone());
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Err(PdfError::Malformed(
        "no MediaBox on page or its ancestors".into(),
    ))
}
