use super::*;

fn compile(text: &str) -> BrandwaveResult<Template> {
    let id = TemplateId::parse("doc").unwrap();
    DocumentCompiler::default().compile(&id, text)
}

fn load_message(err: BrandwaveError) -> String {
    match err {
        BrandwaveError::Load { message, .. } => message,
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[test]
fn compiles_a_plain_document() {
    let t = compile(
        r#"{
            "id": "doc", "name": "Doc",
            "parameters": { "size": { "type": "slider", "min": 1, "max": 50, "default": 10, "label": "Size" } },
            "draw": [
                { "op": "use_fill" },
                { "op": "rect", "x": 0, "y": 0, "w": "size * 2", "h": "params.size" },
                { "op": "fill" }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(t.id(), "doc");
    assert!(!t.uses_generator());
    assert!(t.schema().contains("size"));
    assert!(t.schema().contains("fillColor"));
    assert!(!t.schema().contains("amplitude"));
}

#[test]
fn generator_documents_get_wave_parameters() {
    let t = compile(
        r#"{ "id": "doc", "name": "Doc", "generator": true,
             "draw": [ { "op": "begin_path" }, { "op": "wave_path" }, { "op": "stroke" } ] }"#,
    )
    .unwrap();
    assert!(t.uses_generator());
    for name in ["amplitude", "frequency", "damping", "layers"] {
        assert!(t.schema().contains(name), "missing {name}");
    }
}

#[test]
fn rand_opts_into_a_generator() {
    let t = compile(
        r#"{ "id": "doc", "name": "Doc",
             "draw": [ { "op": "rect", "x": "rand() * width", "y": 0, "w": 1, "h": 1 } ] }"#,
    )
    .unwrap();
    assert!(t.uses_generator());
}

#[test]
fn unknown_identifiers_report_their_location() {
    let err = compile(
        r#"{ "id": "doc", "name": "Doc",
             "draw": [ { "op": "begin_path" }, { "op": "move_to", "x": "nope + 1", "y": 0 } ] }"#,
    )
    .unwrap_err();
    let msg = load_message(err);
    assert!(msg.contains("draw[1].x"), "{msg}");
    assert!(msg.contains("nope"), "{msg}");
}

#[test]
fn wave_ops_need_the_generator_flag() {
    let err = compile(r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "wave_path" } ] }"#)
        .unwrap_err();
    assert!(load_message(err).contains("generator"));
}

#[test]
fn colors_must_be_literals_or_color_parameters() {
    assert!(compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "fill_color", "color": "fillColor" } ] }"#
    )
    .is_ok());
    assert!(compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "fill_color", "color": "rgb(1, 2, 3)" } ] }"#
    )
    .is_ok());
    let err = compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "fill_color", "color": "strokeWidth" } ] }"#,
    )
    .unwrap_err();
    assert!(load_message(err).contains("draw[0].color"));
}

#[test]
fn variables_cannot_shadow_parameters_or_builtins() {
    for name in ["width", "fillOpacity", "params", "2x"] {
        let doc = format!(
            r#"{{ "id": "doc", "name": "Doc", "draw": [ {{ "op": "set", "name": "{name}", "value": 1 }} ] }}"#
        );
        assert!(compile(&doc).is_err(), "{name} should be rejected");
    }
}

#[test]
fn variables_must_be_set_before_use() {
    let err = compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "set", "name": "r", "value": "r + 1" }
        ] }"#,
    )
    .unwrap_err();
    assert!(load_message(err).contains("unknown identifier"));

    assert!(compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "set", "name": "r", "value": 1 },
            { "op": "set", "name": "r", "value": "r + 1" }
        ] }"#
    )
    .is_ok());
}

#[test]
fn text_placeholders_must_name_parameters() {
    let err = compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "text", "text": "{missing}", "x": 0, "y": 0 } ] }"#,
    )
    .unwrap_err();
    assert!(load_message(err).contains("missing"));
}

#[test]
fn when_needs_a_declared_parameter() {
    assert!(compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "when", "param": "fillType", "is": "solid", "body": [] } ] }"#
    )
    .is_ok());
    assert!(compile(
        r#"{ "id": "doc", "name": "Doc", "draw": [ { "op": "when", "param": "shape", "is": "solid", "body": [] } ] }"#
    )
    .is_err());
}

#[test]
fn malformed_json_and_bad_schemas_are_load_errors() {
    let err = compile("{ not json").unwrap_err();
    assert!(matches!(err, BrandwaveError::Load { ref id, .. } if id == "doc"));

    let err = compile(
        r#"{ "id": "doc", "name": "Doc",
             "parameters": { "n": { "type": "slider", "min": 1, "max": 5, "default": 9 } },
             "draw": [] }"#,
    )
    .unwrap_err();
    assert!(load_message(err).contains("outside"));
}

#[test]
fn text_parts_split_literals_and_parameters() {
    let schema = crate::params::schema::ParamSchema::new().with(
        "company",
        crate::params::schema::ParamSpec::text("ACME", "Company"),
    );
    let scope = Scope::new(&schema, false);
    assert_eq!(
        scope.text("Hi {company}!", "t").unwrap(),
        vec![
            TextPart::Lit("Hi ".to_owned()),
            TextPart::Param {
                name: "company".to_owned(),
                default: "ACME".to_owned()
            },
            TextPart::Lit("!".to_owned()),
        ]
    );
    assert_eq!(
        scope.text("open { brace", "t").unwrap(),
        vec![TextPart::Lit("open { brace".to_owned())]
    );
}
