use pdf_diploma::DiplomaRow;
use pdf_diploma_batch::*;

#[test]
fn test_parse_roster_by_header_name() {
    let csv = "profesor,fecha,extra,nombre,curso\n\
               Oscar Pimentel,2025-01-15,x,ana lopez,curso x\n";
    let rows = parse_roster(csv.as_bytes()).unwrap();
    assert_eq!(
        rows,
        vec![DiplomaRow::new("ana lopez", "curso x", "2025-01-15", "Oscar Pimentel")]
    );
}

#[test]
fn test_parse_roster_strips_bom_and_trims() {
    let csv = "\u{FEFF}nombre,curso,fecha,profesor\n  ana  , curso x ,2025-01-15, juan \n";
    let rows = parse_roster(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].nombre, "ana");
    assert_eq!(rows[0].curso, "curso x");
    assert_eq!(rows[0].profesor, "juan");
}

#[test]
fn test_parse_roster_drops_blank_rows() {
    let csv = "nombre,curso,fecha,profesor\n\
               ana,curso,2025-01-01,juan\n\
               ,,,\n\
               \x20,\x20,\x20,\x20\n\
               luis,curso,2025-01-01,juan\n";
    let rows = parse_roster(csv.as_bytes()).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.nombre.as_str()).collect();
    assert_eq!(names, vec!["ana", "luis"]);
}

#[test]
fn test_parse_roster_missing_column_reads_empty() {
    let csv = "nombre,curso,profesor\nana,curso,juan\n";
    let rows = parse_roster(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].fecha, "");
    assert_eq!(rows[0].profesor, "juan");
}

#[test]
fn test_parse_roster_short_record() {
    let csv = "nombre,curso,fecha,profesor\nana,curso\n";
    let rows = parse_roster(csv.as_bytes()).unwrap();
    assert_eq!(rows[0], DiplomaRow::new("ana", "curso", "", ""));
}

#[test]
fn test_manifest_csv() {
    let mut manifest = Manifest::new();
    let ok = DiplomaRow::new("ana", "curso x", "2025-01-15", "juan");
    let bad = DiplomaRow::new("luis", "curso, y", "2025-01-15", "nadie");
    manifest.record_success(&ok);
    manifest.record_error(&bad, "No signature found for profesor='nadie'");

    assert_eq!(manifest.error_count(), 1);
    assert!(manifest.entries()[0].is_success());

    let text = String::from_utf8(manifest.to_csv_bytes().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "nombre,curso,fecha,profesor,resultado");
    assert_eq!(lines[1], "ana,curso x,2025-01-15,juan,exitosamente creado");
    assert_eq!(
        lines[2],
        "luis,\"curso, y\",2025-01-15,nadie,No signature found for profesor='nadie'"
    );
}
