//! End-to-end cycle: open, annotate, reorder, save both ways, reopen.

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;

use inkmark_core::{codec, document, CatalogValue, EditorSession};
use inkmark_types::{PixelPoint, RenderScale};

fn three_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..3)
        .map(|_| {
            let content_id =
                doc.add_object(Object::Stream(Stream::new(dictionary! {}, Vec::new())));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Contents" => Object::Reference(content_id),
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 3,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn page_operators(doc: &Document, page_num: u32) -> Vec<String> {
    let page_id = doc.get_pages()[&page_num];
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content)
        .unwrap()
        .operations
        .into_iter()
        .map(|op| op.operator)
        .collect()
}

#[test]
fn full_edit_cycle_survives_reopen() {
    let scale = RenderScale::from_factor(1.5).unwrap();
    let mut session = EditorSession::open(three_page_pdf()).unwrap();

    let text_index = session
        .add_text_at(2, PixelPoint { x: 150.0, y: 75.0 }, scale)
        .unwrap();
    session.set_text_content(text_index, "reviewed\nok to send");
    session.set_font_size(text_index, 16.0);
    session.set_text_color(text_index, "#1a2b3c");

    session
        .create_redaction_from_drag(
            3,
            PixelPoint { x: 30.0, y: 30.0 },
            PixelPoint { x: 300.0, y: 120.0 },
            scale,
        )
        .unwrap()
        .unwrap();

    // Session-only reordering: original page 3 first.
    session.move_page(2, 0).unwrap();
    assert_eq!(session.page_order(), &[3, 1, 2]);

    let editable = session.save_editable().unwrap();
    let reopened = EditorSession::open(editable).unwrap();

    // Annotation state survives; page order does not persist.
    assert_eq!(reopened.text_objects(), session.text_objects());
    assert_eq!(reopened.redaction_areas(), session.redaction_areas());
    assert_eq!(reopened.page_order(), &[1, 2, 3]);
    assert_eq!(reopened.text_objects()[0].text, "reviewed\nok to send");
    assert_eq!(reopened.text_objects()[0].font_size, 16.0);
}

#[test]
fn flattened_output_draws_and_strips() {
    let scale = RenderScale::from_factor(1.0).unwrap();
    let mut session = EditorSession::open(three_page_pdf()).unwrap();

    let text_index = session
        .add_text_at(3, PixelPoint { x: 50.0, y: 50.0 }, scale)
        .unwrap();
    session.set_text_content(text_index, "final");
    session
        .create_redaction_from_drag(
            1,
            PixelPoint { x: 10.0, y: 10.0 },
            PixelPoint { x: 100.0, y: 60.0 },
            scale,
        )
        .unwrap()
        .unwrap();
    // Page 3 moves to the front, carrying its text object with it.
    session.move_page(2, 0).unwrap();

    let flattened = session.save_flattened().unwrap();
    let doc = Document::load_mem(&flattened).unwrap();

    assert_eq!(document::custom_data_value(&doc), CatalogValue::Absent);
    assert_eq!(codec::decode(document::custom_data_value(&doc)), None);

    // page_order [3, 1, 2]: the text lands on document page 1, the
    // redaction on document page 2.
    assert!(page_operators(&doc, 1).contains(&"Tj".to_string()));
    assert!(page_operators(&doc, 2).contains(&"re".to_string()));
    assert!(!page_operators(&doc, 3).contains(&"Tj".to_string()));

    // Reopening a flattened file starts a clean session.
    let reopened = EditorSession::open(flattened).unwrap();
    assert!(reopened.text_objects().is_empty());
    assert!(reopened.redaction_areas().is_empty());
}

#[test]
fn editable_save_is_stable_across_resaves() {
    let scale = RenderScale::from_factor(1.0).unwrap();
    let mut session = EditorSession::open(three_page_pdf()).unwrap();
    session
        .add_text_at(1, PixelPoint { x: 20.0, y: 20.0 }, scale)
        .unwrap();

    let first = session.save_editable().unwrap();
    let second = EditorSession::open(first.clone())
        .unwrap()
        .save_editable()
        .unwrap();
    let third = EditorSession::open(second.clone())
        .unwrap()
        .save_editable()
        .unwrap();

    let objects_after = |bytes: &[u8]| {
        EditorSession::open(bytes.to_vec())
            .unwrap()
            .text_objects()
            .to_vec()
    };
    assert_eq!(objects_after(&first), objects_after(&second));
    assert_eq!(objects_after(&second), objects_after(&third));
}
