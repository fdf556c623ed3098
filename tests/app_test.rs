//! Application wiring with fake collaborators and a manual clock


use posture_telemetry::{
    app::PostureApp,
    config::Config,
    cycle::{FailureKind, SampleCycle},
    metrics::MetricExtractor,
    scheduler::{Clock, ManualClock},
};
use std::time::Duration;
use test_helpers::{leaning_subject, FakeCamera, ScriptedDetector, SharedReporter};

const MINUTE: Duration = Duration::from_secs(60);

fn configured(interval_minutes: u64) -> Config {
    let mut config = Config::default();
    config.telemetry.token = "token-123".to_string();
    config.schedule.interval_minutes = interval_minutes;
    config
}

#[test]
fn test_scheduled_cycles_report_on_the_interval() {
    let reporter = SharedReporter::default();
    let attempts = reporter.attempts.clone();
    let cycle = SampleCycle::new(
        FakeCamera::working(),
        ScriptedDetector {
            detection: leaning_subject(),
        },
        MetricExtractor::default(),
        reporter,
    );
    let mut app = PostureApp::from_parts(configured(40), cycle).unwrap();

    let clock = ManualClock::new();
    let last = app.run_cycles(clock.clone(), 3).expect("at least one cycle runs");

    assert_eq!(last.unwrap().score.value(), 80);
    assert_eq!(attempts.borrow().len(), 3);
    assert_eq!(clock.now(), 80 * MINUTE);
}

#[test]
fn test_single_cycle_does_not_wait_for_the_interval() {
    let cycle = SampleCycle::new(
        FakeCamera::working(),
        ScriptedDetector {
            detection: leaning_subject(),
        },
        MetricExtractor::default(),
        SharedReporter::default(),
    );
    let mut app = PostureApp::from_parts(configured(40), cycle).unwrap();

    let clock = ManualClock::new();
    assert!(matches!(app.run_cycles(clock.clone(), 1), Some(Ok(_))));
    assert_eq!(clock.now(), Duration::ZERO);
}

#[test]
fn test_failing_cycles_keep_the_schedule() {
    let reporter = SharedReporter::default();
    let attempts = reporter.attempts.clone();
    let cycle = SampleCycle::new(
        FakeCamera::busy(),
        ScriptedDetector {
            detection: leaning_subject(),
        },
        MetricExtractor::default(),
        reporter,
    );
    let mut app = PostureApp::from_parts(configured(10), cycle).unwrap();

    let clock = ManualClock::new();
    let last = app.run_cycles(clock.clone(), 2).unwrap();

    assert_eq!(last.unwrap_err().kind(), FailureKind::Capture);
    assert!(attempts.borrow().is_empty());
    assert_eq!(clock.now(), 10 * MINUTE);
}

#[test]
fn test_placeholder_token_rejected_with_fakes() {
    let cycle = SampleCycle::new(
        FakeCamera::working(),
        ScriptedDetector {
            detection: leaning_subject(),
        },
        MetricExtractor::default(),
        SharedReporter::default(),
    );

    let result = PostureApp::from_parts(Config::default(), cycle);
    assert!(matches!(result, Err(posture_telemetry::Error::ConfigError(_))));
}
