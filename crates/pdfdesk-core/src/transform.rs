//! Geometric page transforms: crop, rotate, reorder, extract, merge.
//!
//! Every transform takes document bytes in and returns fresh bytes out; the
//! source buffer is never mutated. Crop rects arrive in percent space and go
//! through the shared coordinate mapper exactly once.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};
use shared_geom::{percent_to_points, PercentRect};
use shared_pdf::{load, page_ids, page_size, save};

use crate::error::PdfDeskError;
use crate::selection::PageSelection;

/// Crop the selected pages to a percent-space rectangle.
///
/// Both MediaBox and CropBox are rewritten so the page reports the cropped
/// size to downstream consumers.
pub fn crop(
    bytes: &[u8],
    selection: &PageSelection,
    rect: &PercentRect,
) -> Result<Vec<u8>, PdfDeskError> {
    rect.validate()?;

    let mut doc = load(bytes)?;
    let ids = page_ids(&doc);
    let selected = selection.resolve(ids.len())?;

    for &index in &selected {
        let page_id = ids[index];
        let (page_w, page_h) = page_size(&doc, page_id)?;
        let point_rect = percent_to_points(rect, page_w, page_h);

        let bbox = vec![
            Object::Real(point_rect.x as f32),
            Object::Real(point_rect.y as f32),
            Object::Real((point_rect.x + point_rect.width) as f32),
            Object::Real((point_rect.y + point_rect.height) as f32),
        ];
        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfDeskError::Operation(e.to_string()))?;
        page_dict.set("MediaBox", Object::Array(bbox.clone()));
        page_dict.set("CropBox", Object::Array(bbox));
    }

    save(&mut doc).map_err(Into::into)
}

/// Rotate the selected pages by a quarter-turn multiple, accumulated onto
/// any rotation the page already carries.
pub fn rotate(
    bytes: &[u8],
    selection: &PageSelection,
    degrees: i64,
) -> Result<Vec<u8>, PdfDeskError> {
    if degrees % 90 != 0 {
        return Err(PdfDeskError::InvalidRotation(degrees));
    }

    let mut doc = load(bytes)?;
    let ids = page_ids(&doc);
    let selected = selection.resolve(ids.len())?;

    for &index in &selected {
        let page_id = ids[index];
        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfDeskError::Operation(e.to_string()))?;
        let existing = match page_dict.get(b"Rotate") {
            Ok(Object::Integer(v)) => *v,
            _ => 0,
        };
        let normalized = (existing + degrees).rem_euclid(360);
        page_dict.set("Rotate", Object::Integer(normalized));
    }

    save(&mut doc).map_err(Into::into)
}

/// Rebuild the page tree in an explicit new order (zero-based source
/// indices). Indices may repeat (page copy) or be omitted (page drop).
pub fn reorder(bytes: &[u8], order: &[usize]) -> Result<Vec<u8>, PdfDeskError> {
    if order.is_empty() {
        return Err(PdfDeskError::InvalidSelection(
            "new page order is empty".into(),
        ));
    }

    let mut doc = load(bytes)?;
    let ids = page_ids(&doc);
    for &index in order {
        if index >= ids.len() {
            return Err(PdfDeskError::InvalidSelection(format!(
                "page index {} out of range (document has {} pages)",
                index,
                ids.len()
            )));
        }
    }

    let new_refs: Vec<ObjectId> = order.iter().map(|&i| ids[i]).collect();
    update_page_tree(&mut doc, new_refs)?;
    doc.prune_objects();
    doc.compress();

    save(&mut doc).map_err(Into::into)
}

/// Extract the selected pages into a new document, preserving order.
pub fn extract(bytes: &[u8], selection: &PageSelection) -> Result<Vec<u8>, PdfDeskError> {
    let mut doc = load(bytes)?;
    let total = doc.get_pages().len();
    let selected = selection.resolve(total)?;

    // Delete the complement in reverse so page numbers stay stable.
    let keep: std::collections::BTreeSet<usize> = selected.into_iter().collect();
    let delete: Vec<u32> = (0..total)
        .rev()
        .filter(|i| !keep.contains(i))
        .map(|i| i as u32 + 1)
        .collect();
    for page_num in delete {
        doc.delete_pages(&[page_num]);
    }

    doc.prune_objects();
    doc.compress();
    save(&mut doc).map_err(Into::into)
}

/// Merge multiple documents into one, pages in argument order.
pub fn merge(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfDeskError> {
    if documents.is_empty() {
        return Err(PdfDeskError::InvalidSelection(
            "no documents to merge".into(),
        ));
    }
    if documents.len() == 1 {
        return Ok(documents.into_iter().next().unwrap());
    }

    let mut loaded = Vec::with_capacity(documents.len());
    for (i, bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(bytes)
            .map_err(|e| PdfDeskError::Parse(format!("document {}: {}", i, e)))?;
        loaded.push(doc);
    }

    let mut dest = loaded.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_refs = page_ids(&dest);

    for source in loaded {
        let source_refs = page_ids(&source);
        let offset = dest_max_id;

        let mut remapped = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            remapped.insert((old_id.0 + offset, old_id.1), shift_refs(object, offset));
        }
        dest.objects.extend(remapped);

        for old_ref in source_refs {
            dest_refs.push((old_ref.0 + offset, old_ref.1));
        }
        dest_max_id = (source.max_id + offset).max(dest_max_id);
    }

    update_page_tree(&mut dest, dest_refs)?;
    dest.max_id = dest_max_id;
    dest.compress();

    save(&mut dest).map_err(Into::into)
}

/// Shift every object reference inside `obj` by `offset`.
fn shift_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => {
            Object::Array(arr.into_iter().map(|o| shift_refs(o, offset)).collect())
        }
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the document's root Pages node at a new flat Kids list.
fn update_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<(), PdfDeskError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfDeskError::Operation("no Root in trailer".into()))?;
    let pages_id = doc
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PdfDeskError::Operation("no Pages in catalog".into()))?;

    // Reparent every page at the root so nested intermediate nodes are
    // bypassed by the flattened Kids list.
    for &page_ref in &page_refs {
        if let Ok(page_dict) = doc
            .get_object_mut(page_ref)
            .and_then(Object::as_dict_mut)
        {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            pages_dict.set(
                "Kids",
                Object::Array(
                    page_refs
                        .iter()
                        .map(|&id| Object::Reference(id))
                        .collect(),
                ),
            );
            pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
            Ok(())
        }
        _ => Err(PdfDeskError::Operation("invalid Pages dictionary".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_pdf;

    #[test]
    fn test_crop_resizes_selected_pages() {
        let pdf = sample_pdf(2, 200.0, 200.0);
        let rect = PercentRect {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
        };
        let out = crop(&pdf, &PageSelection::Current { index: 0 }, &rect).unwrap();

        let doc = load(&out).unwrap();
        let ids = page_ids(&doc);
        assert_eq!(page_size(&doc, ids[0]).unwrap(), (100.0, 100.0));
        // Page 2 untouched.
        assert_eq!(page_size(&doc, ids[1]).unwrap(), (200.0, 200.0));
    }

    #[test]
    fn test_crop_zero_area_rect_rejected_before_work() {
        let pdf = sample_pdf(1, 200.0, 200.0);
        let rect = PercentRect {
            x: 10.0,
            y: 10.0,
            width: 0.0,
            height: 50.0,
        };
        assert!(matches!(
            crop(&pdf, &PageSelection::All, &rect),
            Err(PdfDeskError::InvalidRect(_))
        ));
    }

    #[test]
    fn test_rotate_sets_and_accumulates() {
        let pdf = sample_pdf(1, 612.0, 792.0);
        let once = rotate(&pdf, &PageSelection::All, 90).unwrap();
        let twice = rotate(&once, &PageSelection::All, 90).unwrap();

        let doc = load(&twice).unwrap();
        let ids = page_ids(&doc);
        let dict = doc.get_object(ids[0]).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Rotate").unwrap().as_i64().unwrap(), 180);
    }

    #[test]
    fn test_rotate_normalizes_into_range() {
        let pdf = sample_pdf(1, 612.0, 792.0);
        let out = rotate(&pdf, &PageSelection::All, -90).unwrap();
        let doc = load(&out).unwrap();
        let ids = page_ids(&doc);
        let dict = doc.get_object(ids[0]).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Rotate").unwrap().as_i64().unwrap(), 270);
    }

    #[test]
    fn test_rotate_rejects_non_quarter_turns() {
        let pdf = sample_pdf(1, 612.0, 792.0);
        assert!(matches!(
            rotate(&pdf, &PageSelection::All, 45),
            Err(PdfDeskError::InvalidRotation(45))
        ));
    }

    #[test]
    fn test_reorder_reverses_pages() {
        let pdf = sample_pdf(3, 612.0, 792.0);
        let out = reorder(&pdf, &[2, 1, 0]).unwrap();
        let doc = load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_reorder_can_duplicate_and_drop() {
        let pdf = sample_pdf(3, 612.0, 792.0);
        let out = reorder(&pdf, &[0, 0, 2]).unwrap();
        let doc = load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_reorder_rejects_out_of_range() {
        let pdf = sample_pdf(3, 612.0, 792.0);
        assert!(reorder(&pdf, &[0, 5]).is_err());
        assert!(reorder(&pdf, &[]).is_err());
    }

    #[test]
    fn test_extract_keeps_only_selection() {
        let pdf = sample_pdf(5, 612.0, 792.0);
        let sel = PageSelection::Expression {
            expr: "1,3,5".to_string(),
        };
        let out = extract(&pdf, &sel).unwrap();
        let doc = load(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_merge_combines_page_counts() {
        let a = sample_pdf(2, 612.0, 792.0);
        let b = sample_pdf(3, 612.0, 792.0);
        let merged = merge(vec![a, b]).unwrap();
        let doc = load(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[test]
    fn test_merge_empty_fails() {
        assert!(merge(vec![]).is_err());
    }

    #[test]
    fn test_merge_single_returns_input() {
        let a = sample_pdf(2, 612.0, 792.0);
        let merged = merge(vec![a.clone()]).unwrap();
        assert_eq!(merged, a);
    }
}
