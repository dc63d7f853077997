mod common;

use common::{approx, engine, run_ticks, PageSurface, TestEngine};
use vizij_scroll_core::{
    AnimationsData, DriverOptions, ElementOptions, EngineError, MomentumMode, PresetRegistry,
    ResolveError, SampleContext, StyleValue,
};

fn animations(name: &str) -> AnimationsData {
    vizij_test_fixtures::animations::load(name).expect("animation fixture")
}

fn landing_page(momentum: MomentumMode) -> TestEngine {
    let mut e = engine(PageSurface::from_scene("landing-page"));
    e.add_driver(
        "scrollY",
        Box::new(|ctx: &SampleContext| ctx.viewport.scroll_y),
        DriverOptions {
            momentum,
            ..DriverOptions::default()
        },
    )
    .unwrap();
    e.init(PresetRegistry::new()).unwrap();
    e
}

#[test]
fn every_animation_fixture_deserializes() {
    for name in vizij_test_fixtures::animations::keys() {
        let data = animations(&name);
        assert!(!data.is_empty(), "{name}");
    }
}

#[test]
fn declared_elements_are_bound_at_init() {
    let e = landing_page(MomentumMode::Off);
    let handles: Vec<u64> = e.elements().map(|el| el.handle().0).collect();
    assert_eq!(handles, vec![1, 5]);
}

#[test]
fn hero_parallax_follows_scroll() {
    let mut e = landing_page(MomentumMode::Off);
    e.surface_mut().scroll_to(400.0);
    e.tick().unwrap();

    assert_eq!(e.surface().style(1, "transform"), Some("translateY(100px)"));
    let hero = e.elements().find(|el| el.handle().0 == 1).unwrap();
    // 400 / 600 eased with easeInQuad
    let opacity = hero.value("opacity").and_then(StyleValue::as_number).unwrap();
    assert!(approx(opacity, 1.0 - 4.0 / 9.0, 1e-12), "opacity {opacity}");
}

#[test]
fn spinner_loops_on_frame_driver_with_decimated_color() {
    let mut e = landing_page(MomentumMode::Off);
    run_ticks(&mut e, 31);
    assert_eq!(e.surface().style(5, "transform"), Some("rotate(90deg)"));
    assert_eq!(e.surface().style(5, "background-color"), Some("rgb(120, 0, 0)"));

    // odd frame: rotation moves, colour holds
    e.tick().unwrap();
    assert_ne!(e.surface().style(5, "transform"), Some("rotate(90deg)"));
    assert_eq!(e.surface().style(5, "background-color"), Some("rgb(120, 0, 0)"));

    e.tick().unwrap();
    assert_ne!(e.surface().style(5, "background-color"), Some("rgb(120, 0, 0)"));

    // 120 frames later the spin has wrapped back to the same angle
    run_ticks(&mut e, 87);
    assert_eq!(e.frame(), 120);
    e.tick().unwrap();
    assert_eq!(e.surface().style(5, "transform"), Some("rotate(0deg)"));
}

#[test]
fn card_stagger_adds_weighted_momentum() {
    let mut e = landing_page(MomentumMode::Relative);
    let ids = e
        .add_elements(".card", &animations("card-stagger"), &ElementOptions::default())
        .unwrap();
    assert_eq!(ids.len(), 3);

    e.surface_mut().scroll_to(300.0);
    e.tick().unwrap();
    // delta 300: m1 = 60, m2 = 12, momentum = 6
    assert_eq!(e.driver("scrollY").map(|d| d.last().momentum), Some(6.0));

    let first = e.element(ids[0]).unwrap();
    let x = first.value("translateX").and_then(StyleValue::as_number).unwrap();
    // inputs [100, 600], t = 0.4 eased out-cubic to 0.784
    assert!(approx(x, -100.0 * 0.216 + 20.0 * 6.0, 1e-9), "translateX {x}");
    // fadeIn 0.2 from the preset: elInBottom -> elCenterVert
    let opacity = first.value("opacity").and_then(StyleValue::as_number).unwrap();
    assert!(approx(opacity, 0.2 * 0.6 + 0.4, 1e-12), "opacity {opacity}");
}

#[test]
fn viewport_resize_re_resolves_every_element() {
    let mut e = landing_page(MomentumMode::Off);
    let hero_id = e.elements().find(|el| el.handle().0 == 1).unwrap().id();
    assert_eq!(
        e.element(hero_id).unwrap().resolved()[0].bindings[0].inputs,
        vec![0.0, 800.0]
    );

    // scrolling alone does not re-resolve
    e.surface_mut().scroll_to(250.0);
    let report = e.tick().unwrap();
    assert!(report.resolve_errors.is_empty());
    assert_eq!(
        e.element(hero_id).unwrap().resolved()[0].bindings[0].inputs,
        vec![0.0, 800.0]
    );

    e.surface_mut().resize(1000.0, 400.0);
    e.surface_mut().scroll_to(200.0);
    e.tick().unwrap();
    assert_eq!(
        e.element(hero_id).unwrap().resolved()[0].bindings[0].inputs,
        vec![0.0, 400.0]
    );
    assert_eq!(e.surface().style(1, "transform"), Some("translateY(100px)"));
}

#[test]
fn explicit_refresh_picks_up_moved_elements() {
    let mut e = landing_page(MomentumMode::Off);
    let ids = e
        .add_elements(".card", &animations("card-stagger"), &ElementOptions::default())
        .unwrap();
    let before = e.element(ids[1]).unwrap().resolved().to_vec();

    if let Some(card) = e
        .surface_mut()
        .elements
        .iter_mut()
        .find(|el| el.handle.0 == 3)
    {
        card.rect.y += 100.0;
    }
    e.refresh_element(ids[1]).unwrap();
    let after = e.element(ids[1]).unwrap().resolved().to_vec();
    assert_ne!(before, after);
    assert_eq!(after[0].bindings[0].inputs[0], before[0].bindings[0].inputs[0] + 100.0);

    e.on_resize().unwrap();
    assert_eq!(e.element(ids[1]).unwrap().resolved(), after.as_slice());
}

#[test]
fn broken_expression_fixture_fails_at_bind_time() {
    let mut e = landing_page(MomentumMode::Off);
    let err = e
        .add_elements(".card", &animations("broken-expression"), &ElementOptions::default())
        .unwrap_err();
    match err {
        EngineError::Resolve {
            property,
            source: ResolveError::Expr { expr, .. },
            ..
        } => {
            assert_eq!(property, "opacity");
            assert_eq!(expr, "window.innerHeight");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(e.elements().count(), 2);
}
