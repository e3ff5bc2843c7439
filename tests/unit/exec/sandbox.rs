use super::*;

use std::sync::Arc;

use crate::params::schema::ParamSchema;
use crate::surface::cmd::{DrawCmd, Paint};
use crate::template::contract::{DrawRoutine, TemplateMeta};

fn template(id: &str, uses_generator: bool, routine: Arc<dyn DrawRoutine>) -> Template {
    Template::new(
        TemplateMeta::new(id, "Test", ""),
        ParamSchema::new(),
        uses_generator,
        routine,
    )
    .unwrap()
}

fn canvas() -> Canvas {
    Canvas::new(120, 80).unwrap()
}

fn square() -> Arc<dyn DrawRoutine> {
    Arc::new(
        |p: &mut Painter, _: &DrawArgs<'_>, _: Option<&mut WaveGenerator>| {
            p.fill_rect(10.0, 10.0, 20.0, 20.0);
            Ok(())
        },
    )
}

#[test]
fn successful_draws_pass_through() {
    let t = template("square", false, square());
    let list = Sandbox::new()
        .execute(&t, canvas(), &ParamMap::new(), 0.0, None)
        .unwrap();
    assert_eq!(list.canvas, canvas());
    assert_eq!(list.len(), 1);
}

#[test]
fn errors_become_execution_failures() {
    let t = template(
        "broken",
        false,
        Arc::new(
            |p: &mut Painter, _: &DrawArgs<'_>, _: Option<&mut WaveGenerator>| {
                p.fill_rect(0.0, 0.0, 5.0, 5.0);
                Err(BrandwaveError::validation("bad input"))
            },
        ),
    );
    let err = Sandbox::new()
        .execute(&t, canvas(), &ParamMap::new(), 0.0, None)
        .unwrap_err();
    assert_eq!(err.template_id, "broken");
    match &err.error {
        BrandwaveError::Execution { id, message } => {
            assert_eq!(id, "broken");
            assert!(message.contains("bad input"));
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[test]
fn panics_are_contained() {
    let t = template(
        "panicky",
        false,
        Arc::new(
            |_: &mut Painter, _: &DrawArgs<'_>, _: Option<&mut WaveGenerator>| -> crate::foundation::error::BrandwaveResult<()> {
                panic!("boom")
            },
        ),
    );
    let err = Sandbox::new()
        .execute(&t, canvas(), &ParamMap::new(), 0.0, None)
        .unwrap_err();
    assert!(err.to_string().contains("draw panicked: boom"), "{err}");
}

#[test]
fn generator_is_built_only_when_requested() {
    let probe: Arc<dyn DrawRoutine> = Arc::new(
        |_: &mut Painter, args: &DrawArgs<'_>, g: Option<&mut WaveGenerator>| match g {
            Some(g) if g.seed() == Some("brand") && g.params().layers == 3 => Ok(()),
            Some(_) => Err(BrandwaveError::validation("wrong generator")),
            None if args.params.contains("expect-none") => Ok(()),
            None => Err(BrandwaveError::validation("missing generator")),
        },
    );
    let mut params = ParamMap::new();
    params.insert("layers", 3);
    let with = template("with-gen", true, probe.clone());
    assert!(Sandbox::new()
        .execute(&with, canvas(), &params, 0.0, Some("brand"))
        .is_ok());

    params.insert("expect-none", true);
    let without = template("without-gen", false, probe);
    assert!(Sandbox::new()
        .execute(&without, canvas(), &params, 0.0, Some("brand"))
        .is_ok());
}

#[test]
fn fallback_is_a_complete_error_frame() {
    let err = RenderError::new(
        "broken",
        canvas(),
        BrandwaveError::execution("broken", "division by zero"),
    );
    let list = err.fallback();
    assert_eq!(list.canvas, canvas());
    assert!(matches!(list.cmds[0], DrawCmd::Clear { rect } if rect == canvas().rect()));
    match &list.cmds[1] {
        DrawCmd::Fill {
            paint: Paint::Solid { color },
            ..
        } => assert_eq!(*color, FALLBACK_BACKGROUND),
        other => panic!("expected the background fill, got {other:?}"),
    }
    let texts: Vec<&str> = list
        .cmds
        .iter()
        .filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts[0], FALLBACK_HEADLINE);
    assert!(texts.len() >= 2);
    assert_eq!(err.into_fallback().fingerprint(), list.fingerprint());
}

#[test]
fn wave_parameters_fall_back_and_clamp() {
    let mut params = ParamMap::new();
    params.insert("amplitude", "loud");
    params.insert("layers", 0);
    params.insert("damping", 7.5);
    params.insert("frequency", 4);
    let p = wave_parameters_from(&params);
    assert_eq!(p.amplitude, WaveParameters::default().amplitude);
    assert_eq!(p.layers, 1);
    assert_eq!(p.damping, 1.0);
    assert_eq!(p.frequency, 4.0);
}

#[test]
fn painter_faults_become_execution_failures() {
    let t = template(
        "giant-text",
        false,
        Arc::new(
            |p: &mut Painter, _: &DrawArgs<'_>, _: Option<&mut WaveGenerator>| {
                p.fill_rect(0.0, 0.0, 5.0, 5.0);
                p.set_font_size(1e15);
                p.fill_text("HUGE", 10.0, 10.0);
                Ok(())
            },
        ),
    );
    let err = Sandbox::new()
        .execute(&t, canvas(), &ParamMap::new(), 0.0, None)
        .unwrap_err();
    match &err.error {
        BrandwaveError::Execution { id, message } => {
            assert_eq!(id, "giant-text");
            assert!(message.contains("font size"));
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}
