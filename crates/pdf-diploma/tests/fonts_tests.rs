use pdf_diploma::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_helvetica_string_width() {
    // H e l l o = 722 + 556 + 222 + 222 + 556
    let width = StandardFont::Helvetica.string_width("Hello", 10.0);
    assert!(approx(width, 22.78), "got {}", width);
}

#[test]
fn test_empty_string_has_zero_width() {
    for font in StandardFont::ALL {
        assert_eq!(font.string_width("", 24.0), 0.0);
    }
}

#[test]
fn test_courier_is_monospaced() {
    let narrow = StandardFont::Courier.string_width("iiii", 10.0);
    let wide = StandardFont::Courier.string_width("WWWW", 10.0);
    assert!(approx(narrow, 24.0));
    assert!(approx(narrow, wide));
}

#[test]
fn test_oblique_shares_upright_widths() {
    let upright = StandardFont::HelveticaBold.string_width("Diploma", 18.0);
    let oblique = StandardFont::HelveticaBoldOblique.string_width("Diploma", 18.0);
    assert!(approx(upright, oblique));
}

#[test]
fn test_accented_letters_use_base_width() {
    let plain = StandardFont::TimesRoman.string_width("Perez", 12.0);
    let accented = StandardFont::TimesRoman.string_width("Pérez", 12.0);
    assert!(approx(plain, accented));
}

#[test]
fn test_win_ansi_encoding() {
    assert_eq!(StandardFont::Helvetica.encode_win_ansi("Año"), vec![b'A', 0xF1, b'o']);
    assert_eq!(StandardFont::Helvetica.encode_win_ansi("“x”"), vec![0x93, b'x', 0x94]);
}

#[test]
fn test_unencodable_characters_become_question_marks() {
    let font = StandardFont::Helvetica;
    assert_eq!(font.encode_win_ansi("a✓b"), b"a?b".to_vec());
    assert_eq!(font.encode_win_ansi("Šimić"), vec![0x8A, b'i', b'm', b'i', b'?']);
    assert!(approx(
        font.string_width("✓", 10.0),
        font.string_width("?", 10.0)
    ));
}

#[test]
fn test_win_ansi_upper_block_and_symbols() {
    let font = StandardFont::Helvetica;
    assert_eq!(
        font.encode_win_ansi("€ŠšŽžŒœŸ™‰"),
        vec![0x80, 0x8A, 0x9A, 0x8E, 0x9E, 0x8C, 0x9C, 0x9F, 0x99, 0x89]
    );
    assert_eq!(font.encode_win_ansi("©®£¢×÷ÐÞ"), vec![0xA9, 0xAE, 0xA3, 0xA2, 0xD7, 0xF7, 0xD0, 0xDE]);

    // € 556, © 737, Œ 1000, Š as S 667
    assert!(approx(font.string_width("€", 10.0), 5.56));
    assert!(approx(font.string_width("©", 10.0), 7.37));
    assert!(approx(font.string_width("Œ", 10.0), 10.0));
    assert!(approx(font.string_width("Š", 10.0), font.string_width("S", 10.0)));
    assert!(approx(StandardFont::TimesRoman.string_width("™", 10.0), 9.8));
}

#[test]
fn test_font_names_parse_case_insensitively() {
    assert_eq!(
        "helvetica-bold".parse::<StandardFont>().unwrap(),
        StandardFont::HelveticaBold
    );
    assert_eq!(
        "Times-Roman".parse::<StandardFont>().unwrap(),
        StandardFont::TimesRoman
    );
    for font in StandardFont::ALL {
        assert_eq!(font.to_string().parse::<StandardFont>().unwrap(), font);
    }
}

#[test]
fn test_unknown_font_is_config_error() {
    let err = "Comic Sans".parse::<StandardFont>().unwrap_err();
    assert!(matches!(err, DiplomaError::Config(msg) if msg.contains("Comic Sans")));
}
