//! Property tests for trace path generation and the validator.

use craftbench_testkit::ring_positions;
use craftbench_world::{
    centroid, PointerSample, StartOutcome, TraceEvent, TraceHit, TracePath, TraceSettings,
    TraceState, TraceValidator,
};
use glam::Vec3;
use proptest::prelude::*;

fn position_strategy() -> impl Strategy<Value = Vec3> {
    (-10.0f32..10.0, -2.0f32..2.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn armed(count: usize) -> (TraceValidator, TraceSettings) {
    let settings = TraceSettings {
        tolerance: 0.01,
        ..TraceSettings::default()
    };
    let mut validator = TraceValidator::new(settings);
    validator.start(&ring_positions(Vec3::new(0.0, 1.0, 0.0), 0.5, count));
    validator.sample(&PointerSample { pressed: true, ..PointerSample::default() });
    (validator, settings)
}

/// Surface point under the current head waypoint.
fn under_head(validator: &TraceValidator, settings: &TraceSettings) -> Vec3 {
    validator.path().unwrap().head().unwrap() - Vec3::Y * settings.surface_lift
}

fn held_at(point: Vec3) -> PointerSample {
    PointerSample {
        held: true,
        hit: Some(TraceHit {
            point,
            on_workbench: true,
        }),
        ..PointerSample::default()
    }
}

proptest! {
    /// Property: N items yield N + 3 waypoints, closed, at a single height.
    #[test]
    fn path_cardinality_and_shape(
        positions in prop::collection::vec(position_strategy(), 2..12),
    ) {
        let settings = TraceSettings::default();
        let path = TracePath::generate(&positions, &settings).unwrap();
        prop_assert_eq!(path.len(), positions.len() + 3);
        prop_assert!(path.is_closed());

        let height = centroid(&positions).y + settings.height_offset;
        for point in path.points() {
            prop_assert!((point.y - height).abs() < 1e-4);
        }
    }

    /// Property: every ring radius is one of the three bands.
    #[test]
    fn radii_cycle_through_bands(
        positions in prop::collection::vec(position_strategy(), 2..12),
    ) {
        let settings = TraceSettings::default();
        let center = centroid(&positions);
        let points = TracePath::generate(&positions, &settings).unwrap().points();
        for (i, point) in points[..points.len() - 1].iter().enumerate() {
            let radius = Vec3::new(point.x - center.x, 0.0, point.z - center.z).length();
            let expected = settings.base_radius + (i % 3) as f32 * settings.band_step;
            prop_assert!((radius - expected).abs() < 1e-3);
        }
    }

    /// Property: following the waypoints exactly always succeeds, and the
    /// remaining count strictly decreases on the way.
    #[test]
    fn following_the_path_succeeds(count in 2usize..10) {
        let settings = TraceSettings {
            tolerance: 0.01,
            ..TraceSettings::default()
        };
        let mut validator = TraceValidator::new(settings);
        let positions = ring_positions(Vec3::new(0.0, 1.0, 0.0), 0.5, count);
        prop_assert_eq!(validator.start(&positions), StartOutcome::Started);
        prop_assert_eq!(
            validator.sample(&PointerSample { pressed: true, ..PointerSample::default() }),
            Some(TraceEvent::Began)
        );

        let mut last_remaining = validator.path().unwrap().len();
        loop {
            let head = validator.path().unwrap().head().unwrap();
            let surface = head - Vec3::Y * settings.surface_lift;
            match validator.sample(&held_at(surface)) {
                Some(TraceEvent::Reached { remaining }) => {
                    prop_assert!(remaining < last_remaining);
                    last_remaining = remaining;
                }
                Some(TraceEvent::Succeeded) => break,
                other => prop_assert!(false, "unexpected event {:?}", other),
            }
        }
        prop_assert_eq!(validator.state(), TraceState::Success);
    }

    /// Property: releasing before the end always fails.
    #[test]
    fn early_release_fails(count in 2usize..10) {
        let mut validator = TraceValidator::default();
        let positions = ring_positions(Vec3::ZERO, 1.0, count);
        validator.start(&positions);
        validator.sample(&PointerSample { pressed: true, ..PointerSample::default() });
        let event = validator.sample(&PointerSample { released: true, ..PointerSample::default() });
        prop_assert_eq!(event, Some(TraceEvent::Failed));
        prop_assert_eq!(validator.state(), TraceState::Failed);
        prop_assert_eq!(validator.start(&positions), StartOutcome::SessionActive);
    }

    /// Property: releasing after any number of pops that leaves two or more
    /// waypoints fails.
    #[test]
    fn release_after_partial_progress_fails(
        (count, pops) in (2usize..10).prop_flat_map(|n| (Just(n), 0..=n + 1)),
    ) {
        let (mut validator, settings) = armed(count);
        for _ in 0..pops {
            let event = validator.sample(&held_at(under_head(&validator, &settings)));
            prop_assert!(matches!(event, Some(TraceEvent::Reached { .. })), "expected Reached, got {:?}", event);
        }
        prop_assert_eq!(validator.path().unwrap().len(), count + 3 - pops);

        let release = PointerSample { released: true, ..PointerSample::default() };
        prop_assert_eq!(validator.sample(&release), Some(TraceEvent::Failed));
        prop_assert_eq!(validator.state(), TraceState::Failed);
    }

    /// Property: the last pop wins over a release in the same frame.
    #[test]
    fn final_pop_and_release_together_succeed(count in 2usize..10) {
        let (mut validator, settings) = armed(count);
        while validator.path().unwrap().len() > 2 {
            validator.sample(&held_at(under_head(&validator, &settings)));
        }
        let last = PointerSample {
            released: true,
            ..held_at(under_head(&validator, &settings))
        };
        prop_assert_eq!(validator.sample(&last), Some(TraceEvent::Succeeded));
        prop_assert_eq!(validator.state(), TraceState::Success);
    }
}
