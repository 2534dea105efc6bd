//! Low-level helpers over `lopdf` documents: catalog entry access and page
//! geometry lookups used by the save paths.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::codec::{CatalogValue, CUSTOM_DATA_KEY};
use crate::error::EditorError;

pub(crate) fn structure_err(e: lopdf::Error) -> EditorError {
    EditorError::Structure(e.to_string())
}

fn catalog_id(doc: &Document) -> Result<ObjectId, EditorError> {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(structure_err)
}

fn catalog_mut(doc: &mut Document) -> Result<&mut Dictionary, EditorError> {
    let id = catalog_id(doc)?;
    doc.get_object_mut(id)
        .and_then(Object::as_dict_mut)
        .map_err(structure_err)
}

/// Read and classify whatever occupies the custom-data catalog key.
pub fn custom_data_value(doc: &Document) -> CatalogValue {
    let entry = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(CUSTOM_DATA_KEY.as_bytes()).ok());
    CatalogValue::classify(entry)
}

/// Write the encoded custom-data value, overwriting any prior entry.
pub fn set_custom_data(doc: &mut Document, value: Object) -> Result<(), EditorError> {
    catalog_mut(doc)?.set(CUSTOM_DATA_KEY, value);
    Ok(())
}

/// Delete the custom-data entry if present. Returns whether one existed.
pub fn remove_custom_data(doc: &mut Document) -> Result<bool, EditorError> {
    Ok(catalog_mut(doc)?.remove(CUSTOM_DATA_KEY.as_bytes()).is_some())
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(*v as f64),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Page width/height in PDF units at scale 1.0, from the page's MediaBox,
/// walking up the Pages tree when the box is inherited.
pub fn page_size(doc: &Document, page_id: ObjectId) -> Result<(f64, f64), EditorError> {
    let mut current = page_id;
    // Bounded walk in case of a malformed parent cycle.
    for _ in 0..16 {
        let dict = doc.get_dictionary(current).map_err(structure_err)?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let array = resolve(doc, media_box)
                .as_array()
                .map_err(structure_err)?;
            if array.len() != 4 {
                return Err(EditorError::Structure(
                    "MediaBox does not have four entries".to_string(),
                ));
            }
            let mut corners = [0.0f64; 4];
            for (slot, obj) in corners.iter_mut().zip(array.iter()) {
                *slot = as_number(resolve(doc, obj)).ok_or_else(|| {
                    EditorError::Structure("MediaBox entry is not a number".to_string())
                })?;
            }
            return Ok((corners[2] - corners[0], corners[3] - corners[1]));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Err(EditorError::Structure(
        "no MediaBox found for page".to_string(),
    ))
}
