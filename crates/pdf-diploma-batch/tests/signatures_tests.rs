use pdf_diploma_batch::signatures::{basename, looks_like_image_filename, normalize_filename, normalize_key};
use pdf_diploma_batch::*;

fn entry(name: &str, professor_name: &str, url: &str) -> SignatureEntry {
    SignatureEntry {
        name: name.to_string(),
        professor_name: professor_name.to_string(),
        location: url.to_string(),
    }
}

fn index() -> SignatureIndex {
    SignatureIndex::from_entries(vec![
        entry(
            "Firma Oscar",
            "Oscar Pimentel",
            "https://cdn.example.com/firmas/oscar_pimentel.gif",
        ),
        entry("Ana Ruiz", "", "https://cdn.example.com/firmas/ana_ruiz.png?v=2"),
        entry("Sin URL", "Nadie", ""),
    ])
}

#[test]
fn test_normalization() {
    assert_eq!(normalize_key("  Oscar   PIMENTEL "), "oscar pimentel");
    assert_eq!(normalize_filename(" Oscar Pimentel.GIF"), "oscar_pimentel.gif");
}

#[test]
fn test_image_filename_detection() {
    assert!(looks_like_image_filename("oscar_pimentel.gif"));
    assert!(looks_like_image_filename("FIRMA.JPEG "));
    assert!(looks_like_image_filename("a.webp"));
    assert!(!looks_like_image_filename("Oscar Pimentel"));
    assert!(!looks_like_image_filename("firma.pdf"));
}

#[test]
fn test_basename() {
    assert_eq!(basename("https://cdn.example.com/a/b/firma.png?x=1#y"), "firma.png");
    assert_eq!(basename("firma.png"), "firma.png");
    assert_eq!(basename("C:\\firmas\\firma.png"), "firma.png");
}

#[test]
fn test_resolve_by_name_and_professor_name() {
    let index = index();
    let oscar = Some("https://cdn.example.com/firmas/oscar_pimentel.gif");
    assert_eq!(index.resolve("oscar pimentel"), oscar);
    assert_eq!(index.resolve("  FIRMA   oscar "), oscar);
}

#[test]
fn test_resolve_by_file_name() {
    let index = index();
    assert_eq!(
        index.resolve("Oscar_Pimentel.GIF"),
        Some("https://cdn.example.com/firmas/oscar_pimentel.gif")
    );
    assert_eq!(
        index.resolve("ana_ruiz.png"),
        Some("https://cdn.example.com/firmas/ana_ruiz.png?v=2")
    );
}

#[test]
fn test_file_lookup_does_not_fall_back_to_names() {
    let index = SignatureIndex::from_entries(vec![entry(
        "firma.png",
        "",
        "https://cdn.example.com/otra.png",
    )]);
    assert_eq!(index.resolve("firma.png"), None);
}

#[test]
fn test_unresolved_values() {
    let index = index();
    assert_eq!(index.resolve(""), None);
    assert_eq!(index.resolve("   "), None);
    assert_eq!(index.resolve("Desconocido"), None);
    assert_eq!(index.resolve("nadie"), None);
}

#[test]
fn test_entries_without_location_are_ignored() {
    let index = index();
    assert_eq!(index.file_count(), 2);
    assert_eq!(index.name_count(), 3);
}

#[test]
fn test_entries_deserialize_from_api_shape() {
    let json = r#"[{"name":"A","professorName":"Prof A","url":"https://x/a.png","id":7},{"name":"B"}]"#;
    let entries: Vec<SignatureEntry> = serde_json::from_str(json).unwrap();
    assert_eq!(entries[0], entry("A", "Prof A", "https://x/a.png"));
    assert_eq!(entries[1].location, "");
}
