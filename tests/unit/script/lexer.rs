use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_operators_and_idents() {
    assert_eq!(
        kinds("a >= 2 && !b"),
        vec![
            TokenKind::Ident("a".to_owned()),
            TokenKind::Ge,
            TokenKind::Number(2.0),
            TokenKind::AndAnd,
            TokenKind::Bang,
            TokenKind::Ident("b".to_owned()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_numbers_with_fraction_and_exponent() {
    assert_eq!(
        kinds(".5 1.25 3e2"),
        vec![
            TokenKind::Number(0.5),
            TokenKind::Number(1.25),
            TokenKind::Number(300.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_conditional_tokens() {
    assert_eq!(
        kinds("x ? 1 : 2"),
        vec![
            TokenKind::Ident("x".to_owned()),
            TokenKind::Question,
            TokenKind::Number(1.0),
            TokenKind::Colon,
            TokenKind::Number(2.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn rejects_bad_exponent() {
    let err = lex("2e").unwrap_err();
    assert_eq!(err.offset, 1);
}

#[test]
fn rejects_non_ascii_without_panicking() {
    let err = lex("1 +é").unwrap_err();
    assert_eq!(err.offset, 3);
    assert!(lex("=é").is_err());
}

#[test]
fn rejects_unknown_characters() {
    let err = lex("a # b").unwrap_err();
    assert_eq!(err.offset, 2);
    assert!(err.to_string().contains("unexpected character"));
}

#[test]
fn degree_suffix_converts_to_radians() {
    match kinds("90deg")[0] {
        TokenKind::Number(v) => assert!((v - std::f64::consts::FRAC_PI_2).abs() < 1e-12),
        ref other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_number_suffixes() {
    let err = lex("2px").unwrap_err();
    assert_eq!(err.offset, 1);
    assert!(err.message.contains("px"));
}

#[test]
fn single_logic_characters_must_be_doubled() {
    let err = lex("a & b").unwrap_err();
    assert_eq!(err.offset, 2);
    assert!(err.message.contains("doubled"));
}

#[test]
fn rejects_oversized_sources() {
    let src = "1+".repeat(MAX_SOURCE_LEN) + "1";
    let err = lex(&src).unwrap_err();
    assert!(err.message.contains("longer than"));
    assert!(lex(&"1".repeat(MAX_SOURCE_LEN)).is_ok());
}
