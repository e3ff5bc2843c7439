use super::*;

use crate::foundation::core::Canvas;
use crate::generate::wave::WaveParameters;
use crate::script::compile::{DEFAULT_OP_BUDGET, DocumentCompiler};
use crate::script::document::TemplateDocument;
use crate::surface::cmd::{DrawCmd, Paint};
use crate::surface::display_list::DisplayList;
use crate::template::contract::Template;

fn build(compiler: DocumentCompiler, json: &str) -> Template {
    let doc = TemplateDocument::from_json(json).unwrap();
    compiler.compile_document(&doc).unwrap()
}

fn run(
    template: &Template,
    params: &ParamMap,
    generator: Option<&mut WaveGenerator>,
) -> (BrandwaveResult<()>, DisplayList) {
    let mut painter = Painter::new(Canvas::new(100, 100).unwrap());
    let args = DrawArgs {
        width: 100.0,
        height: 100.0,
        params,
        time: 0.0,
    };
    let result = template.draw(&mut painter, &args, generator);
    (result, painter.finish())
}

fn draw(json: &str, params: &ParamMap) -> (BrandwaveResult<()>, DisplayList) {
    run(&build(DocumentCompiler::default(), json), params, None)
}

fn exec_message(result: BrandwaveResult<()>) -> String {
    match result {
        Err(BrandwaveError::Execution { id, message }) => {
            assert_eq!(id, "doc");
            message
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[test]
fn rect_fill_uses_the_fill_color() {
    let (result, list) = draw(
        r##"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "fill_color", "color": "#ff0000" },
            { "op": "rect", "x": 10, "y": 10, "w": "width / 2", "h": 20 },
            { "op": "fill" }
        ] }"##,
        &ParamMap::new(),
    );
    result.unwrap();
    assert_eq!(list.len(), 1);
    match &list.cmds[0] {
        DrawCmd::Fill {
            paint: Paint::Solid { color },
            ..
        } => assert_eq!(*color, Rgba8::opaque(0xff, 0, 0)),
        other => panic!("expected a solid fill, got {other:?}"),
    }
}

#[test]
fn fill_type_none_skips_fills() {
    let doc = r#"{ "id": "doc", "name": "Doc", "draw": [
        { "op": "use_fill" },
        { "op": "rect", "x": 0, "y": 0, "w": 10, "h": 10 },
        { "op": "fill" }
    ] }"#;
    let mut params = ParamMap::new();
    params.insert("fillType", "none");
    let (result, list) = draw(doc, &params);
    result.unwrap();
    assert!(list.is_empty());

    let (_, list) = draw(doc, &ParamMap::new());
    assert_eq!(list.len(), 1);
}

#[test]
fn repeat_binds_its_counter() {
    let (result, list) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "set", "name": "total", "value": 0 },
            { "op": "repeat", "count": 4, "var": "i", "body": [
                { "op": "set", "name": "total", "value": "total + i" }
            ] },
            { "op": "if", "cond": "total == 6", "then": [
                { "op": "rect", "x": 0, "y": 0, "w": 1, "h": 1 },
                { "op": "fill" }
            ] }
        ] }"#,
        &ParamMap::new(),
    );
    result.unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn parameters_override_defaults() {
    let doc = r#"{ "id": "doc", "name": "Doc",
        "parameters": {
            "count": { "type": "slider", "min": 0, "max": 10, "default": 2 },
            "mirror": { "type": "toggle", "default": false }
        },
        "draw": [
            { "op": "repeat", "count": "count + (mirror ? 1 : 0)", "body": [
                { "op": "begin_path" },
                { "op": "rect", "x": 0, "y": 0, "w": 1, "h": 1 },
                { "op": "fill" }
            ] }
        ] }"#;
    let (_, list) = draw(doc, &ParamMap::new());
    assert_eq!(list.len(), 2);

    let mut params = ParamMap::new();
    params.insert("count", 5);
    params.insert("mirror", true);
    let (_, list) = draw(doc, &params);
    assert_eq!(list.len(), 6);
}

#[test]
fn when_matches_one_of_a_list() {
    let doc = r#"{ "id": "doc", "name": "Doc", "draw": [
        { "op": "when", "param": "fillType", "is": ["solid", "gradient"], "body": [
            { "op": "rect", "x": 0, "y": 0, "w": 1, "h": 1 },
            { "op": "fill" }
        ] }
    ] }"#;
    let (_, list) = draw(doc, &ParamMap::new());
    assert_eq!(list.len(), 1);

    let mut params = ParamMap::new();
    params.insert("fillType", "none");
    let (_, list) = draw(doc, &params);
    assert!(list.is_empty());
}

#[test]
fn text_substitutes_parameters() {
    let doc = r#"{ "id": "doc", "name": "Doc",
        "parameters": { "company": { "type": "text", "default": "ACME" } },
        "draw": [ { "op": "text", "text": "Hi {company}", "x": 50, "y": 50, "size": 12 } ] }"#;
    let text_of = |list: &DisplayList| match &list.cmds[0] {
        DrawCmd::Text { text, size, .. } => {
            assert_eq!(*size, 12.0);
            text.clone()
        }
        other => panic!("expected text, got {other:?}"),
    };

    let (_, list) = draw(doc, &ParamMap::new());
    assert_eq!(text_of(&list), "Hi ACME");

    let mut params = ParamMap::new();
    params.insert("company", "Globex");
    let (_, list) = draw(doc, &params);
    assert_eq!(text_of(&list), "Hi Globex");
}

#[test]
fn division_by_zero_is_an_execution_error() {
    let (result, _) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "begin_path" },
            { "op": "move_to", "x": "1 / 0", "y": 0 }
        ] }"#,
        &ParamMap::new(),
    );
    assert!(exec_message(result).contains("non-finite"));
}

#[test]
fn runaway_loops_exhaust_the_budget() {
    let template = build(
        DocumentCompiler::new(200, 10_000),
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "repeat", "count": 5000, "body": [
                { "op": "translate", "x": 1, "y": 1 }
            ] }
        ] }"#,
    );
    let (result, _) = run(&template, &ParamMap::new(), None);
    assert_eq!(exec_message(result), BUDGET_EXHAUSTED);
}

#[test]
fn repeat_counts_are_capped() {
    let template = build(
        DocumentCompiler::new(DEFAULT_OP_BUDGET, 10),
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "repeat", "count": 11, "body": [] }
        ] }"#,
    );
    let (result, _) = run(&template, &ParamMap::new(), None);
    assert!(exec_message(result).contains("exceeds the cap of 10"));
}

#[test]
fn each_point_visits_every_sample() {
    let template = build(
        DocumentCompiler::default(),
        r#"{ "id": "doc", "name": "Doc", "generator": true, "draw": [
            { "op": "each_point", "resolution": 10, "body": [
                { "op": "begin_path" },
                { "op": "arc", "x": "point_x", "y": "point_y", "r": "1 + point_intensity" },
                { "op": "fill" }
            ] }
        ] }"#,
    );
    let mut generator = WaveGenerator::new(WaveParameters::default(), Some("points"));
    let (result, list) = run(&template, &ParamMap::new(), Some(&mut generator));
    result.unwrap();
    assert_eq!(list.len(), 10);
}

#[test]
fn wave_ops_fail_without_a_generator() {
    let template = build(
        DocumentCompiler::default(),
        r#"{ "id": "doc", "name": "Doc", "generator": true, "draw": [
            { "op": "begin_path" },
            { "op": "wave_path" },
            { "op": "stroke" }
        ] }"#,
    );
    let (result, _) = run(&template, &ParamMap::new(), None);
    assert!(exec_message(result).contains("generator"));
}

#[test]
fn rand_is_reproducible() {
    let template = build(
        DocumentCompiler::default(),
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "repeat", "count": 5, "body": [
                { "op": "begin_path" },
                { "op": "arc", "x": "rand() * width", "y": "rand() * height", "r": 3 },
                { "op": "fill" }
            ] }
        ] }"#,
    );
    let (_, a) = run(&template, &ParamMap::new(), None);
    let (_, b) = run(&template, &ParamMap::new(), None);
    assert_eq!(a.fingerprint(), b.fingerprint());

    let mut g1 = WaveGenerator::new(WaveParameters::default(), Some("one"));
    let mut g2 = WaveGenerator::new(WaveParameters::default(), Some("one"));
    let (_, c) = run(&template, &ParamMap::new(), Some(&mut g1));
    let (_, d) = run(&template, &ParamMap::new(), Some(&mut g2));
    assert_eq!(c.fingerprint(), d.fingerprint());
}

#[test]
fn oversized_arcs_fail_promptly() {
    let started = std::time::Instant::now();
    let (result, list) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "begin_path" },
            { "op": "arc", "x": 32, "y": 32, "r": "1e60", "start": 0, "end": "tau" },
            { "op": "fill" }
        ] }"#,
        &ParamMap::new(),
    );
    assert!(exec_message(result).contains("arc radius"));
    assert!(list.is_empty());
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}

#[test]
fn large_arcs_under_a_shrinking_scale_are_drawn() {
    let (result, list) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "scale", "x": 1e-9, "y": 1e-9 },
            { "op": "begin_path" },
            { "op": "arc", "x": 5e10, "y": 5e10, "r": 1e10, "start": 0, "end": "tau" },
            { "op": "fill" }
        ] }"#,
        &ParamMap::new(),
    );
    result.unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn dashes_finer_than_the_limit_fail_the_draw() {
    let mut params = ParamMap::new();
    params.insert("strokeType", "dashed");
    let (result, list) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "scale", "x": 1e-7, "y": 1e-7 },
            { "op": "use_stroke" },
            { "op": "begin_path" },
            { "op": "move_to", "x": 0, "y": 3e8 },
            { "op": "line_to", "x": 6e8, "y": 3e8 },
            { "op": "stroke" }
        ] }"#,
        &params,
    );
    assert!(exec_message(result).contains("dashes"));
    assert!(list.is_empty());
}

#[test]
fn huge_line_widths_and_font_sizes_fail_the_draw() {
    let (result, _) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "line_width", "width": 1e12 },
            { "op": "rect", "x": 0, "y": 0, "w": 10, "h": 10 },
            { "op": "stroke" }
        ] }"#,
        &ParamMap::new(),
    );
    assert!(exec_message(result).contains("line width"));

    let (result, _) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "text", "text": "HI", "x": 10, "y": 10, "size": 1e12 }
        ] }"#,
        &ParamMap::new(),
    );
    assert!(exec_message(result).contains("font size"));
}

#[test]
fn far_away_coordinates_fail_the_draw() {
    let (result, _) = draw(
        r#"{ "id": "doc", "name": "Doc", "draw": [
            { "op": "begin_path" },
            { "op": "move_to", "x": 0, "y": 0 },
            { "op": "line_to", "x": 1e15, "y": 0 },
            { "op": "stroke" }
        ] }"#,
        &ParamMap::new(),
    );
    assert!(exec_message(result).contains("coordinate"));
}

#[test]
fn emitted_geometry_counts_against_the_budget() {
    let doc = |sides: u32| {
        format!(
            r#"{{ "id": "doc", "name": "Doc", "draw": [
                {{ "op": "begin_path" }},
                {{ "op": "polygon", "x": 50, "y": 50, "r": 40, "sides": {sides} }},
                {{ "op": "fill" }}
            ] }}"#
        )
    };
    let (result, _) = run(&build(DocumentCompiler::new(200, 10_000), &doc(1000)), &ParamMap::new(), None);
    assert_eq!(exec_message(result), BUDGET_EXHAUSTED);

    let (result, list) = run(&build(DocumentCompiler::new(200, 10_000), &doc(3)), &ParamMap::new(), None);
    result.unwrap();
    assert_eq!(list.len(), 1);
}
