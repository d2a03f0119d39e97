use image::{Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_diploma::transparency::encode_png;
use pdf_diploma::*;
use serde_json::json;

/// One-page template whose MediaBox and Rotate live on the `Pages` node.
fn create_template(width: i64, height: i64, rotate: Option<i64>) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Times-Roman".to_vec())),
    ]));
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]);

    let content = b"BT /F1 36 Tf 150 700 Td (DIPLOMA) Tj ET".to_vec();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
    ]));

    let mut pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
    ]);
    if let Some(degrees) = rotate {
        pages_dict.set("Rotate", Object::Integer(degrees));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

/// Template whose pages carry their own MediaBox and a marker comment.
fn create_multi_page_template(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = sizes
        .iter()
        .enumerate()
        .map(|(idx, (width, height))| {
            let content = format!("% page{}\n0 0 m 10 10 l S", idx + 1).into_bytes();
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(*width),
                        Object::Integer(*height),
                    ]),
                ),
            ]));
            Object::Reference(page_id)
        })
        .collect();

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

fn template_xobject_content(doc: &Document, page_id: lopdf::ObjectId) -> String {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let tpl_id = xobjects.get(b"Tpl").unwrap().as_reference().unwrap();
    let stream = doc.get_object(tpl_id).unwrap().as_stream().unwrap();
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn create_layout() -> LayoutConfig {
    LayoutConfig::from_value(json!({
        "estudiante": { "font": { "name": "Helvetica-Bold", "size": 28 }, "y": 400 },
        "curso": { "font": { "name": "Helvetica", "size": 18 }, "y": 350 },
        "profesor-signature": { "x": 100, "y": 120, "size": 125 },
        "profesor": {
            "font": { "name": "Times-Roman", "size": 12 },
            "x_range": [80, 260],
            "y": 110
        },
        "fecha": { "font": { "name": "Times-Roman", "size": 12 }, "x": 420, "y": 110 }
    }))
    .unwrap()
}

fn signature_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    for x in 0..width {
        img.put_pixel(x, height / 2, Rgba([0, 0, 0, 255]));
    }
    encode_png(&img).unwrap()
}

fn row() -> DiplomaRow {
    DiplomaRow::new("ana lopez", "curso x", "2025-01-15", " juan perez ")
}

fn page_of(bytes: &[u8]) -> (Document, lopdf::ObjectId) {
    let doc = Document::load_mem(bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().unwrap();
    (doc, page_id)
}

fn xobject_names(doc: &Document, page_id: lopdf::ObjectId) -> Vec<String> {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    match resources.get(b"XObject") {
        Ok(obj) => obj
            .as_dict()
            .unwrap()
            .iter()
            .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn test_compose_without_signature() {
    let template = Template::from_bytes(&create_template(612, 792, None)).unwrap();
    let composed = compose(&template, &create_layout(), &row(), None).unwrap();

    assert_eq!(
        composed.signature,
        SignatureOutcome::Skipped(SkipReason::NotProvided)
    );

    let (doc, page_id) = page_of(&composed.bytes);
    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();

    assert!(content.starts_with("q /Tpl Do Q"));
    assert!(content.contains("(Ana Lopez) Tj"));

    let layout = create_layout();
    let (x, y) = pdf_diploma::layout::place_text(
        "Ana Lopez",
        layout.estudiante.font.font,
        layout.estudiante.font.size,
        &layout.estudiante.placement,
        612.0,
    );
    assert!(content.contains(&format!("{} {} Td (Ana Lopez) Tj", x, y)));
    assert!(content.contains("420 110 Td (enero de 2025) Tj"));
    assert!(content.contains("(CURSO X) Tj"));
    assert!(content.contains("(enero de 2025) Tj"));
    assert!(content.contains("(juan perez) Tj"));
    assert!(!content.contains("/Sig Do"));
    assert_eq!(xobject_names(&doc, page_id), vec!["Tpl".to_string()]);
}

#[test]
fn test_output_keeps_template_geometry() {
    let template = Template::from_bytes(&create_template(595, 842, Some(90))).unwrap();
    assert_eq!(template.page_size(), (595.0, 842.0));

    let composed = compose(&template, &create_layout(), &row(), None).unwrap();
    let (doc, page_id) = page_of(&composed.bytes);
    let page = doc.get_dictionary(page_id).unwrap();

    let media_box: Vec<f32> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect();
    assert_eq!(media_box, vec![0.0, 0.0, 595.0, 842.0]);
    assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
}

#[test]
fn test_student_name_centered_on_template_width() {
    let template = Template::from_bytes(&create_template(842, 595, None)).unwrap();
    let layout = create_layout();
    let (overlay, _) = build_overlay(template.page_size(), &layout, &row(), None);

    let run = &overlay.text_runs()[0];
    assert_eq!(run.text, "Ana Lopez");
    let width = StandardFont::HelveticaBold.string_width("Ana Lopez", 28.0);
    assert!((run.x - (421.0 - width / 2.0 + 60.0)).abs() < 1e-3);
}

#[test]
fn test_draw_order() {
    let layout = create_layout();
    let (overlay, _) = build_overlay((612.0, 792.0), &layout, &row(), None);
    let texts: Vec<&str> = overlay.text_runs().iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Ana Lopez", "CURSO X", "juan perez", "enero de 2025"]);
}

#[test]
fn test_signature_is_embedded_with_soft_mask() {
    let template = Template::from_bytes(&create_template(612, 792, None)).unwrap();
    let png = signature_png(200, 100);
    let composed = compose(&template, &create_layout(), &row(), Some(&png)).unwrap();

    assert_eq!(composed.signature, SignatureOutcome::Embedded);

    let (doc, page_id) = page_of(&composed.bytes);
    let mut names = xobject_names(&doc, page_id);
    names.sort();
    assert_eq!(names, vec!["Sig".to_string(), "Tpl".to_string()]);

    let page = doc.get_dictionary(page_id).unwrap();
    let xobjects = page
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"XObject")
        .unwrap()
        .as_dict()
        .unwrap();
    let sig_id = xobjects.get(b"Sig").unwrap().as_reference().unwrap();
    let sig = doc.get_object(sig_id).unwrap().as_stream().unwrap();
    assert_eq!(sig.dict.get(b"Width").unwrap().as_i64().unwrap(), 200);
    assert!(sig.dict.get(b"SMask").is_ok());

    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
    assert!(content.contains("/Sig Do"));
}

#[test]
fn test_signature_fits_and_centers_in_box() {
    let layout = create_layout();
    let png = signature_png(200, 100);
    let (overlay, outcome) = build_overlay((612.0, 792.0), &layout, &row(), Some(&png));

    assert!(outcome.is_embedded());
    let rect = overlay.signature_rect().unwrap();
    assert_eq!((rect.width, rect.height), (125.0, 62.5));
    assert_eq!((rect.x, rect.y), (100.0, 151.25));
}

#[test]
fn test_unreadable_signature_still_produces_diploma() {
    let template = Template::from_bytes(&create_template(612, 792, None)).unwrap();
    let composed = compose(
        &template,
        &create_layout(),
        &row(),
        Some(b"GIF89a but not really"),
    )
    .unwrap();

    assert!(matches!(
        composed.signature,
        SignatureOutcome::Skipped(SkipReason::Unreadable(_))
    ));
    let (doc, page_id) = page_of(&composed.bytes);
    assert_eq!(xobject_names(&doc, page_id), vec!["Tpl".to_string()]);
}

#[test]
fn test_special_characters_are_escaped() {
    let template = Template::from_bytes(&create_template(612, 792, None)).unwrap();
    let row = DiplomaRow::new("josé (pepe)", "diseño", "hoy", "ana\\b");
    let composed = compose(&template, &create_layout(), &row, None).unwrap();

    let (doc, page_id) = page_of(&composed.bytes);
    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
    assert!(content.contains("(Jos\\351 \\(pepe\\)) Tj"));
    assert!(content.contains("(DISE\\321O) Tj"));
    assert!(content.contains("(hoy) Tj"));
    assert!(content.contains("(ana\\\\b) Tj"));
}

#[test]
fn test_compose_bytes_matches_parsed_template() {
    let bytes = create_template(612, 792, None);
    let composed = compose_bytes(&bytes, &create_layout(), &row(), None).unwrap();
    let (doc, _) = page_of(&composed.bytes);
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_overlay_only_document() {
    let layout = create_layout();
    let png = signature_png(50, 50);
    let (overlay, _) = build_overlay((612.0, 792.0), &layout, &row(), Some(&png));
    let bytes = overlay.to_pdf_bytes().unwrap();

    let (doc, page_id) = page_of(&bytes);
    assert_eq!(xobject_names(&doc, page_id), vec!["Sig".to_string()]);
    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
    assert!(content.contains("(Ana Lopez) Tj"));
    assert!(!content.contains("/Tpl"));
}

#[test]
fn test_unreadable_template_is_rejected() {
    let err = Template::from_bytes(b"not a pdf at all").unwrap_err();
    assert!(matches!(err, DiplomaError::Template(_)));
}

#[test]
fn test_only_first_template_page_is_used() {
    let template =
        Template::from_bytes(&create_multi_page_template(&[(612, 792), (300, 300)])).unwrap();
    assert_eq!(template.page_size(), (612.0, 792.0));

    let composed = compose(&template, &create_layout(), &row(), None).unwrap();
    let (doc, page_id) = page_of(&composed.bytes);

    let tpl = template_xobject_content(&doc, page_id);
    assert!(tpl.contains("% page1"));
    assert!(!tpl.contains("% page2"));
}

#[test]
fn test_template_without_pages_is_rejected() {
    let err = Template::from_bytes(&create_multi_page_template(&[])).unwrap_err();
    assert!(matches!(err, DiplomaError::Template(_)));
}

#[tokio::test]
async fn test_template_load_from_file() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), create_template(612, 792, None)).unwrap();
    let template = Template::load(temp.path()).await.unwrap();
    assert_eq!(template.page_size(), (612.0, 792.0));
}
