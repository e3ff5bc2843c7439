use super::*;
use crate::params::schema::ParamSpec;

fn noop() -> Arc<dyn DrawRoutine> {
    Arc::new(|_: &mut Painter, _: &DrawArgs<'_>, _: Option<&mut WaveGenerator>| Ok(()))
}

#[test]
fn id_allow_list() {
    for ok in ["wave-bars", "A1", "x"] {
        assert!(is_valid_template_id(ok), "{ok}");
    }
    for bad in ["", "../../etc/passwd", "a/b", "a..b", "a_b", "a b", "é", "a.json"] {
        assert!(!is_valid_template_id(bad), "{bad}");
    }
    assert!(matches!(
        TemplateId::parse("../x"),
        Err(BrandwaveError::InvalidId(_))
    ));
}

#[test]
fn humanized_names() {
    assert_eq!(humanize_id("wave-bars"), "Wave Bars");
    assert_eq!(humanize_id("pulse--rings-"), "Pulse Rings");
    assert_eq!(TemplateMeta::placeholder("audio-bars").name, "Audio Bars");
}

#[test]
fn template_rejects_malformed_descriptors() {
    let bad_id = Template::new(TemplateMeta::new("a/b", "A", ""), ParamSchema::new(), false, noop());
    assert!(matches!(bad_id, Err(BrandwaveError::InvalidId(_))));

    let no_name = Template::new(TemplateMeta::new("a", "  ", ""), ParamSchema::new(), false, noop());
    assert!(matches!(no_name, Err(BrandwaveError::Validation(_))));

    let bad_default = Template::new(
        TemplateMeta::new("a", "A", ""),
        ParamSchema::new().with("mode", ParamSpec::select("zig", &[("zag", "Zag")], "Mode")),
        false,
        noop(),
    );
    assert!(matches!(bad_default, Err(BrandwaveError::Validation(_))));

    let bad_range = Template::new(
        TemplateMeta::new("a", "A", ""),
        ParamSchema::new().with("n", ParamSpec::slider(1.0, 5.0, 0.0, 1.0, "N")),
        false,
        noop(),
    );
    assert!(bad_range.is_err());
}

#[test]
fn template_accepts_universal_schema() {
    let t = Template::new(
        TemplateMeta::new("ok", "Ok", "fine"),
        ParamSchema::new().with_universal(),
        true,
        noop(),
    )
    .unwrap();
    assert_eq!(t.id(), "ok");
    assert!(t.uses_generator());
    assert!(t.schema().contains("fillColor"));
}

#[test]
fn draw_delegates_to_routine() {
    let routine: Arc<dyn DrawRoutine> = Arc::new(
        |p: &mut Painter, args: &DrawArgs<'_>, _: Option<&mut WaveGenerator>| {
            p.fill_rect(0.0, 0.0, args.width, args.height);
            Ok(())
        },
    );
    let t = Template::new(TemplateMeta::new("box", "Box", ""), ParamSchema::new(), false, routine)
        .unwrap();
    let mut painter = Painter::new(crate::foundation::core::Canvas {
        width: 4,
        height: 4,
    });
    let params = ParamMap::new();
    let args = DrawArgs {
        width: 4.0,
        height: 4.0,
        params: &params,
        time: 0.0,
    };
    t.draw(&mut painter, &args, None).unwrap();
    assert_eq!(painter.command_count(), 1);
}
