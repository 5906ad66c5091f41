//! Property tests for the editor core.
//!
//! Covers:
//! - Range expansion length, padding and ordering
//! - Proportional resize across arbitrary gesture sequences
//! - Drag scaling independent of on-screen render size
//! - Project JSON round trips

use folio_core::{
    expand_range, CanvasViewport, Element, ElementPatch, ElementStore, InteractionMachine, Point,
    PointerEvent, PointerTarget, RangeError, RangeExpansion, Size,
};
use proptest::prelude::*;

// ============================================================================
// Range expansion
// ============================================================================

proptest! {
    #[test]
    fn range_expansion_is_complete_and_ordered(
        prefix in "[A-Za-z-]{0,6}",
        start in 0u64..5_000,
        span in 0u64..200,
        pad in 0usize..3,
    ) {
        let end = start + span;
        let width = start.to_string().len() + pad;
        let pattern = format!("{prefix}{start:0width$}~{prefix}{end:0width$}");

        let tokens = expand_range(&pattern).expect("valid pattern");
        prop_assert_eq!(tokens.len() as u64, span + 1);

        let mut previous = None;
        for (i, token) in tokens.iter().enumerate() {
            prop_assert!(token.starts_with(&prefix));
            let digits = &token[prefix.len()..];
            prop_assert!(digits.len() >= width);
            let n: u64 = digits.parse().expect("numeric suffix");
            prop_assert_eq!(n, start + i as u64);
            if let Some(p) = previous {
                prop_assert!(n > p);
            }
            previous = Some(n);
        }
    }

    #[test]
    fn reversed_ranges_are_rejected(a in 1u64..10_000, b in 0u64..10_000) {
        prop_assume!(a > b);
        let result = RangeExpansion::parse(&format!("N{a}~N{b}"));
        prop_assert_eq!(result, Err(RangeError::RangeOrderError { start: a, end: b }));
    }
}

#[test]
fn documented_examples() {
    let tokens = expand_range("2-071~2-171").expect("valid");
    assert_eq!(tokens.len(), 101);
    assert_eq!(tokens[0], "2-071");
    assert_eq!(tokens[100], "2-171");

    assert!(matches!(
        expand_range("A5~B9"),
        Err(RangeError::PrefixMismatch { .. })
    ));
    assert!(matches!(
        expand_range("abc~xyz"),
        Err(RangeError::UnrecognizedNumber(_))
    ));
    assert!(matches!(
        expand_range("5~3"),
        Err(RangeError::RangeOrderError { .. })
    ));
}

// ============================================================================
// Gestures
// ============================================================================

fn image_store(intrinsic: Size) -> (ElementStore, folio_core::ElementId) {
    let mut store = ElementStore::new();
    let id = store.add(Element::image("data:,", intrinsic, Point::new(50.0, 50.0)));
    (store, id)
}

proptest! {
    #[test]
    fn resize_preserves_aspect_ratio(
        w in 10.0f32..2000.0,
        h in 10.0f32..2000.0,
        render_scale in 0.25f32..3.0,
        gestures in prop::collection::vec(prop::collection::vec(-400.0f32..400.0, 1..6), 1..5),
    ) {
        let (mut store, id) = image_store(Size::new(w, h));
        let ratio = h / w;
        let viewport = CanvasViewport::new(
            Size::a4(),
            Point::new(0.0, 0.0),
            Size::new(Size::a4().width * render_scale, Size::a4().height * render_scale),
        );
        let mut machine = InteractionMachine::new();

        for moves in gestures {
            machine.handle(
                &mut store,
                &viewport,
                &PointerEvent::down(500.0, 500.0, PointerTarget::ResizeHandle(id.clone())),
            );
            for dx in moves {
                machine.handle(&mut store, &viewport, &PointerEvent::moved(500.0 + dx, 500.0 - dx));
            }
            machine.handle(&mut store, &viewport, &PointerEvent::up(0.0, 0.0));

            let size = store.get(&id).and_then(Element::image_size).expect("image");
            prop_assert!(size.width >= folio_core::interaction::MIN_IMAGE_WIDTH);
            prop_assert!(((size.height / size.width) - ratio).abs() <= ratio * 1e-3);
        }
    }

    #[test]
    fn drag_delta_scales_with_render_size(
        dx in -300.0f32..300.0,
        dy in -300.0f32..300.0,
        render_scale in 0.25f32..3.0,
        left in -100.0f32..100.0,
        top in -100.0f32..100.0,
    ) {
        let (mut store, id) = image_store(Size::new(1.0, 1.0));
        let viewport = CanvasViewport::new(
            Size::a4(),
            Point::new(left, top),
            Size::new(Size::a4().width * render_scale, Size::a4().height * render_scale),
        );
        let mut machine = InteractionMachine::new();

        machine.handle(
            &mut store,
            &viewport,
            &PointerEvent::down(left + 60.0, top + 60.0, PointerTarget::Element(id.clone())),
        );
        machine.handle(
            &mut store,
            &viewport,
            &PointerEvent::moved(left + 60.0 + dx, top + 60.0 + dy),
        );

        let position = store.get(&id).expect("element").position;
        let tolerance = 1e-2 * (1.0 + (dx.abs() + dy.abs()) / render_scale);
        prop_assert!((position.x - (50.0 + dx / render_scale)).abs() <= tolerance);
        prop_assert!((position.y - (50.0 + dy / render_scale)).abs() <= tolerance);
    }
}

// ============================================================================
// Persistence
// ============================================================================

proptest! {
    #[test]
    fn project_round_trip(
        texts in prop::collection::vec(("\\PC{0,12}", -100.0f32..900.0, -100.0f32..1200.0, 8.0f32..400.0), 0..6),
        rotation_index in 0usize..4,
    ) {
        let mut store = ElementStore::new();
        for (content, x, y, size) in texts {
            let id = store.add(Element::text(content, Point::new(x, y)));
            store.update(&id, &ElementPatch {
                font_size: Some(size),
                rotation: Some(folio_core::element::ROTATION_STEPS[rotation_index]),
                ..ElementPatch::default()
            });
        }
        store.add(Element::image(
            "data:image/png;base64,AAAA",
            Size::new(3.0, 2.0),
            Point::new(1.5, 2.5),
        ));

        let json = store.serialize().expect("serialize");
        let mut loaded = ElementStore::new();
        loaded.deserialize(&json).expect("deserialize");
        prop_assert_eq!(loaded.elements(), store.elements());
    }
}
