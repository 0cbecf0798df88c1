#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::city_params::FlowParams;
    use crate::flow::{FlowEvent, FlowEventManager, FlowIntensity, FlowPhase, SystemState};

    const HUB: Vec3 = Vec3::new(0.0, 12.0, 0.0);

    fn manager() -> FlowEventManager {
        FlowEventManager::new(FlowParams::default())
    }

    fn dest(i: usize) -> Vec3 {
        Vec3::new(i as f32, 4.0, 0.0)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // -------------------------------------------------------------------------
    // FlowEvent lifecycle
    // -------------------------------------------------------------------------

    #[test]
    fn transient_ramps_in_holds_and_ramps_out() {
        let params = FlowParams::default();
        let mut event = FlowEvent::transient(1, "a", HUB, dest(0), &params);
        assert_eq!(event.phase(), FlowPhase::Spawning);
        assert_eq!(event.opacity(), 0.0);

        // 10% of 2.4 s
        event.advance(0.24);
        assert_eq!(event.phase(), FlowPhase::Spawning);
        assert!(approx(event.opacity(), 0.5), "{}", event.opacity());

        event.advance(0.96); // 50%
        assert_eq!(event.phase(), FlowPhase::Active);
        assert!(approx(event.opacity(), 1.0));

        event.advance(0.96); // 90%
        assert_eq!(event.phase(), FlowPhase::Fading);
        assert!(approx(event.opacity(), 0.5), "{}", event.opacity());

        event.advance(0.5);
        assert_eq!(event.phase(), FlowPhase::Done);
        assert_eq!(event.opacity(), 0.0);
        assert_eq!(event.progress(), 1.0);
    }

    #[test]
    fn persistent_holds_steady_until_stopped() {
        let params = FlowParams::default();
        let mut stream = FlowEvent::persistent(1, "a", HUB, dest(0), &params);
        assert_eq!(stream.intensity, FlowIntensity::Stream);

        stream.advance(0.3);
        assert_eq!(stream.phase(), FlowPhase::Spawning);
        assert!(approx(stream.opacity(), 0.425));

        for _ in 0..100 {
            stream.advance(0.5);
        }
        assert_eq!(stream.phase(), FlowPhase::Active);
        assert!(approx(stream.opacity(), 0.85));

        stream.stop();
        assert_eq!(stream.phase(), FlowPhase::Fading);
        stream.advance(0.4);
        assert!(approx(stream.opacity(), 0.425), "{}", stream.opacity());
        stream.advance(0.4);
        assert_eq!(stream.phase(), FlowPhase::Done);
    }

    #[test]
    fn done_is_terminal() {
        let params = FlowParams::default();
        let mut event = FlowEvent::transient(1, "a", HUB, dest(0), &params);
        event.advance(10.0);
        assert!(event.is_done());
        event.stop();
        event.advance(1.0);
        assert!(event.is_done());
        assert_eq!(event.opacity(), 0.0);
    }

    #[test]
    fn stopping_mid_fade_in_starts_from_current_opacity() {
        let params = FlowParams::default();
        let mut stream = FlowEvent::persistent(1, "a", HUB, dest(0), &params);
        stream.advance(0.3);
        let before = stream.opacity();
        stream.stop();
        assert!(approx(stream.opacity(), before));
        stream.stop();
        assert_eq!(stream.phase(), FlowPhase::Fading);
    }

    #[test]
    fn pulse_wraps_into_unit_range() {
        let params = FlowParams::default();
        let mut stream = FlowEvent::persistent(1, "a", HUB, dest(0), &params);
        for _ in 0..37 {
            stream.advance(0.33);
            assert!((0.0..1.0).contains(&stream.pulse()));
        }
    }

    // -------------------------------------------------------------------------
    // Debounce
    // -------------------------------------------------------------------------

    #[test]
    fn triggers_inside_debounce_window_collapse() {
        let mut m = manager();
        assert!(m.trigger("a", HUB, dest(0), 0.0).is_some());
        assert!(m.trigger("a", HUB, dest(0), 0.3).is_none());
        assert_eq!(m.transient_count(), 1);
    }

    #[test]
    fn triggers_spaced_beyond_window_each_fire() {
        let mut m = manager();
        assert!(m.trigger("a", HUB, dest(0), 0.0).is_some());
        assert!(m.trigger("a", HUB, dest(0), 0.6).is_some());
        assert_eq!(m.transient_count(), 2);
    }

    #[test]
    fn debounce_is_per_target() {
        let mut m = manager();
        assert!(m.trigger("a", HUB, dest(0), 0.0).is_some());
        assert!(m.trigger("b", HUB, dest(1), 0.0).is_some());
        assert_eq!(m.transient_count(), 2);
    }

    #[test]
    fn ten_triggers_in_200ms_then_one_after_600ms() {
        let mut m = manager();
        let mut now = 0.0;
        for _ in 0..10 {
            m.trigger("same", HUB, dest(0), now);
            m.tick(0.02, now);
            now += 0.02;
        }
        assert_eq!(m.transient_count(), 1);

        for _ in 0..30 {
            m.tick(0.02, now);
            now += 0.02;
        }
        assert!(m.trigger("same", HUB, dest(0), now).is_some());
        assert_eq!(m.transient_count(), 2);
    }

    #[test]
    fn debounce_memory_is_pruned_on_tick() {
        let mut m = manager();
        for i in 0..30 {
            m.trigger(&format!("t{i}"), HUB, dest(i), 0.0);
        }
        assert_eq!(m.debounce_entries(), 30);
        m.tick(0.016, 0.2);
        assert_eq!(m.debounce_entries(), 30);
        m.tick(0.016, 1.0);
        assert_eq!(m.debounce_entries(), 0);
    }

    // -------------------------------------------------------------------------
    // Capacity and eviction
    // -------------------------------------------------------------------------

    #[test]
    fn one_over_capacity_evicts_exactly_the_oldest() {
        let mut m = manager();
        for i in 0..20 {
            m.trigger(&format!("t{i}"), HUB, dest(i), 0.0);
        }
        assert_eq!(m.transient_count(), 20);
        m.trigger("t20", HUB, dest(20), 0.0);
        assert_eq!(m.transient_count(), 20);
        let targets: Vec<&str> = m.transients().map(|e| e.target.as_str()).collect();
        assert!(!targets.contains(&"t0"));
        assert_eq!(targets.first(), Some(&"t1"));
        assert_eq!(targets.last(), Some(&"t20"));
    }

    #[test]
    fn twenty_five_rapid_triggers_keep_most_recent_twenty() {
        let mut m = manager();
        for i in 0..25 {
            m.trigger(&format!("t{i}"), HUB, dest(i), i as f64 * 0.001);
        }
        assert_eq!(m.transient_count(), 20);
        let mut targets: Vec<String> = m.transients().map(|e| e.target.clone()).collect();
        targets.sort();
        let mut expected: Vec<String> = (5..25).map(|i| format!("t{i}")).collect();
        expected.sort();
        assert_eq!(targets, expected);
    }

    #[test]
    fn eviction_follows_insertion_order_not_activity() {
        let mut m = manager();
        for i in 0..20 {
            m.trigger(&format!("t{i}"), HUB, dest(i), 0.0);
        }
        // t0 fires again after the window: a second t0 event is appended.
        m.trigger("t0", HUB, dest(0), 1.0);
        let first: Vec<&str> = m.transients().take(1).map(|e| e.target.as_str()).collect();
        assert_eq!(first, vec!["t1"]);
        assert_eq!(m.transients().filter(|e| e.target == "t0").count(), 1);
    }

    #[test]
    fn small_capacity_is_respected() {
        let mut m = FlowEventManager::new(FlowParams {
            capacity: 3,
            ..FlowParams::default()
        });
        for i in 0..10 {
            m.trigger(&format!("t{i}"), HUB, dest(i), 0.0);
            assert!(m.transient_count() <= 3);
        }
    }

    // -------------------------------------------------------------------------
    // Persistent stream
    // -------------------------------------------------------------------------

    #[test]
    fn starting_same_stream_twice_is_a_no_op() {
        let mut m = manager();
        assert!(m.start_persistent_stream("a", HUB, dest(0)));
        assert!(!m.start_persistent_stream("a", HUB, dest(0)));
        assert!(m.retiring().is_empty());
        assert_eq!(m.persistent_target(), Some("a"));
    }

    #[test]
    fn never_two_active_persistent_streams() {
        let mut m = manager();
        m.start_persistent_stream("a", HUB, dest(0));
        m.tick(1.0, 1.0);
        m.start_persistent_stream("b", HUB, dest(1));
        assert_eq!(m.persistent_target(), Some("b"));
        assert_eq!(m.retiring().len(), 1);

        for step in 0..40 {
            let active = m
                .events()
                .filter(|e| e.is_persistent() && !e.is_stopping())
                .count();
            assert!(active <= 1, "step {step}: {active} active streams");
            m.tick(0.05, 1.0 + step as f64 * 0.05);
        }
        assert!(m.retiring().is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut m = manager();
        assert!(!m.stop_persistent_stream());
        m.start_persistent_stream("a", HUB, dest(0));
        assert!(m.stop_persistent_stream());
        assert!(!m.stop_persistent_stream());
        assert_eq!(m.persistent_target(), None);
        assert_eq!(m.retiring().len(), 1);
        m.tick(1.0, 1.0);
        assert_eq!(m.live_count(), 0);
    }

    #[test]
    fn restarting_retired_target_creates_fresh_stream() {
        let mut m = manager();
        m.start_persistent_stream("a", HUB, dest(0));
        m.stop_persistent_stream();
        assert!(m.start_persistent_stream("a", HUB, dest(0)));
        assert_eq!(m.retiring().len(), 1);
        assert_eq!(m.persistent().map(|s| s.phase()), Some(FlowPhase::Spawning));
    }

    // -------------------------------------------------------------------------
    // State, lifecycle, snapshot
    // -------------------------------------------------------------------------

    #[test]
    fn state_follows_live_counts() {
        let mut m = manager();
        assert_eq!(m.current_state(), SystemState::Idle);
        for i in 0..4 {
            m.trigger(&format!("t{i}"), HUB, dest(i), 0.0);
            assert_eq!(m.current_state(), SystemState::Streaming);
        }
        m.trigger("t4", HUB, dest(4), 0.0);
        assert_eq!(m.current_state(), SystemState::BulkUpdate);
        m.tick(3.0, 3.0);
        assert_eq!(m.current_state(), SystemState::Idle);
    }

    #[test]
    fn persistent_stream_overrides_bulk() {
        let mut m = manager();
        for i in 0..10 {
            m.trigger(&format!("t{i}"), HUB, dest(i), 0.0);
        }
        m.start_persistent_stream("a", HUB, dest(0));
        assert_eq!(m.current_state(), SystemState::Streaming);
    }

    #[test]
    fn error_override_takes_precedence() {
        let mut m = manager();
        m.start_persistent_stream("a", HUB, dest(0));
        m.set_error_override(Some("build failed".to_string()));
        assert_eq!(m.current_state(), SystemState::Error);
        assert_eq!(m.error_reason(), Some("build failed"));
        m.set_error_override(None);
        assert_eq!(m.current_state(), SystemState::Streaming);
    }

    #[test]
    fn finished_transients_are_removed_on_tick() {
        let mut m = manager();
        m.trigger("a", HUB, dest(0), 0.0);
        m.tick(1.0, 1.0);
        assert_eq!(m.transient_count(), 1);
        m.tick(1.5, 2.5);
        assert_eq!(m.transient_count(), 0);
    }

    #[test]
    fn dispose_releases_everything_mid_fade() {
        let mut m = manager();
        m.trigger("a", HUB, dest(0), 0.0);
        m.start_persistent_stream("b", HUB, dest(1));
        m.start_persistent_stream("c", HUB, dest(2));
        m.tick(0.1, 0.1);
        m.dispose();
        assert_eq!(m.live_count(), 0);
        assert_eq!(m.debounce_entries(), 0);
        m.tick(0.1, 0.2);
        assert!(m.trigger("a", HUB, dest(0), 0.2).is_some());
    }

    #[test]
    fn retarget_moves_every_event_for_target() {
        let mut m = manager();
        m.trigger("a", HUB, dest(0), 0.0);
        m.trigger("a", HUB, dest(0), 1.0);
        m.start_persistent_stream("a", HUB, dest(0));
        m.trigger("b", HUB, dest(1), 0.0);
        let moved = m.retarget("a", Vec3::new(50.0, 2.0, 50.0));
        assert_eq!(moved, 3);
        assert!(m
            .events()
            .filter(|e| e.target == "b")
            .all(|e| e.destination == dest(1)));
    }

    #[test]
    fn snapshot_reports_events_and_stream_flag() {
        let mut m = manager();
        m.trigger("a", HUB, dest(0), 0.0);
        m.start_persistent_stream("s", HUB, dest(1));
        m.start_persistent_stream("t", HUB, dest(2));
        m.tick(0.2, 0.2);
        let snap = m.snapshot();
        assert_eq!(snap.events.len(), 3);
        assert_eq!(snap.state, SystemState::Streaming);
        assert_eq!(snap.stream_target.as_deref(), Some("t"));
        let streaming: Vec<&str> = snap
            .events
            .iter()
            .filter(|e| e.streaming)
            .map(|e| e.target.as_str())
            .collect();
        assert_eq!(streaming, vec!["t"]);
        assert!(snap.events.iter().all(|e| (0.0..=1.0).contains(&e.opacity)));
    }

    #[test]
    fn drop_target_removes_every_event_for_that_item() {
        let mut m = manager();
        m.trigger("a", HUB, dest(0), 0.0);
        m.trigger("b", HUB, dest(1), 0.0);
        m.start_persistent_stream("a", HUB, dest(0));
        m.start_persistent_stream("b", HUB, dest(1));
        m.start_persistent_stream("a", HUB, dest(0));
        // transient a, transient b, retiring a, retiring b, stream a
        assert_eq!(m.live_count(), 5);

        assert_eq!(m.drop_target("a"), 3);
        assert_eq!(m.persistent_target(), None);
        assert_eq!(m.targets(), vec!["b".to_string()]);
        assert_eq!(m.drop_target("missing"), 0);
    }

    #[test]
    fn classify_thresholds() {
        assert_eq!(SystemState::classify(false, 0, 5), SystemState::Idle);
        assert_eq!(SystemState::classify(false, 4, 5), SystemState::Streaming);
        assert_eq!(SystemState::classify(false, 5, 5), SystemState::BulkUpdate);
        assert_eq!(SystemState::classify(true, 0, 5), SystemState::Streaming);
        assert_eq!(SystemState::classify(true, 50, 5), SystemState::Streaming);
    }
}
