use std::time::Duration;

use tracing::{debug, trace};

use crate::color::{interpolate, Color};
use crate::error::SinkError;
use crate::palettes::{ColorMap, Palette};
use crate::partition::merge_onto;
use crate::sinks::ConfigSink;

use super::cancel::{CancelToken, Wake};

/// Shortest pause between two steps of a fade.
pub const MIN_STEP_DELAY: Duration = Duration::from_millis(5);

/// Step count and per-step pause of one fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTiming {
    pub steps: u32,
    pub step_delay: Duration,
}

impl FadeTiming {
    /// Spread `duration_ms` over `steps` intervals, at least [`MIN_STEP_DELAY`] apart.
    pub fn new(duration_ms: u64, steps: u32) -> Self {
        let steps = steps.max(1);
        let step_delay = Duration::from_millis(duration_ms / u64::from(steps)).max(MIN_STEP_DELAY);
        Self { steps, step_delay }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    Completed,
    Cancelled,
}

/// Colors for one instant of a fade from `from` to `to`.
///
/// Keys defined on both sides are blended; a key on one side only keeps that
/// side's value as-is. A key whose values are both malformed is dropped.
pub fn step_colors(from: &ColorMap, to: &ColorMap, t: f32) -> ColorMap {
    let mut step = ColorMap::new();
    for key in from.keys().chain(to.keys()) {
        if step.contains_key(key) {
            continue;
        }
        let value = match (from.get(key), to.get(key)) {
            (Some(a), Some(b)) => {
                if Color::from_hex(a).is_none() && Color::from_hex(b).is_none() {
                    continue;
                }
                interpolate(a, b, t)
            }
            (None, Some(b)) => b.clone(),
            (Some(a), None) => a.clone(),
            (None, None) => continue,
        };
        step.insert(key.clone(), value);
    }
    step
}

/// Drive one transition as `steps + 1` full writes at increasing `t`.
///
/// The token is checked before every write and observed while waiting between
/// steps; once cancelled, no further writes are made.
pub async fn fade(
    from: &Palette,
    to: &Palette,
    baseline: &ColorMap,
    timing: &FadeTiming,
    cancel: &CancelToken,
    sink: &dyn ConfigSink,
) -> Result<FadeOutcome, SinkError> {
    debug!(from = %from.name, to = %to.name, steps = timing.steps, "fade started");

    for i in 0..=timing.steps {
        if cancel.is_cancelled() {
            debug!(from = %from.name, to = %to.name, step = i, "fade cancelled");
            return Ok(FadeOutcome::Cancelled);
        }

        let t = i as f32 / timing.steps as f32;
        let frame = merge_onto(baseline, &step_colors(&from.colors, &to.colors, t));
        sink.apply(&frame)?;
        trace!(step = i, t, "fade step applied");

        if i < timing.steps && cancel.sleep(timing.step_delay).await == Wake::Cancelled {
            debug!(from = %from.name, to = %to.name, step = i, "fade cancelled");
            return Ok(FadeOutcome::Cancelled);
        }
    }

    debug!(from = %from.name, to = %to.name, "fade finished");
    Ok(FadeOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sinks::MemorySink;

    fn map(entries: &[(&str, &str)]) -> ColorMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn palette(name: &str, entries: &[(&str, &str)]) -> Palette {
        Palette {
            name: name.to_string(),
            colors: map(entries),
        }
    }

    #[test]
    fn timing_divides_duration_by_steps() {
        let timing = FadeTiming::new(1500, 30);
        assert_eq!(timing.steps, 30);
        assert_eq!(timing.step_delay, Duration::from_millis(50));
    }

    #[test]
    fn timing_has_a_floor() {
        assert_eq!(FadeTiming::new(10, 30).step_delay, MIN_STEP_DELAY);
        assert_eq!(FadeTiming::new(100, 0).steps, 1);
    }

    #[test]
    fn shared_keys_are_blended() {
        let step = step_colors(
            &map(&[("bg", "#000000")]),
            &map(&[("bg", "#ffffff")]),
            0.5,
        );
        let mid = Color::from_hex(&step["bg"]).unwrap();
        assert!(mid.r > 0x80, "expected a linear-light midpoint, got {mid}");
    }

    #[test]
    fn one_sided_keys_keep_their_value() {
        let from = map(&[("old", "#111111")]);
        let to = map(&[("new", "#222222")]);

        for t in [0.0, 0.5, 1.0] {
            let step = step_colors(&from, &to, t);
            assert_eq!(step["old"], "#111111");
            assert_eq!(step["new"], "#222222");
        }
    }

    #[test]
    fn malformed_values_pass_through_or_drop() {
        let from = map(&[("half", "oops"), ("both", "nah"), ("short", "#fff")]);
        let to = map(&[("half", "#abcdef"), ("both", "nope")]);

        let step = step_colors(&from, &to, 0.5);

        assert_eq!(step["half"], "#abcdef");
        assert!(!step.contains_key("both"));
        assert_eq!(step["short"], "#fff");
    }

    #[tokio::test(start_paused = true)]
    async fn writes_every_step_over_the_baseline() {
        let sink = MemorySink::new();
        let from = palette("dark", &[("bg", "#000000")]);
        let to = palette("light", &[("bg", "#ffffff")]);
        let baseline = map(&[("border", "#333333")]);

        let outcome = fade(
            &from,
            &to,
            &baseline,
            &FadeTiming::new(100, 4),
            &CancelToken::new(),
            &sink,
        )
        .await
        .unwrap();

        assert_eq!(outcome, FadeOutcome::Completed);
        let writes = sink.writes();
        assert_eq!(writes.len(), 5);
        assert_eq!(writes[0]["bg"], "#000000");
        assert_eq!(writes[4]["bg"], "#ffffff");
        assert!(writes.iter().all(|w| w["border"] == "#333333"));
    }

    #[tokio::test(start_paused = true)]
    async fn takes_the_configured_duration() {
        let sink = MemorySink::new();
        let from = palette("a", &[("bg", "#000000")]);
        let to = palette("b", &[("bg", "#ffffff")]);
        let started = tokio::time::Instant::now();

        fade(
            &from,
            &to,
            &ColorMap::new(),
            &FadeTiming::new(300, 3),
            &CancelToken::new(),
            &sink,
        )
        .await
        .unwrap();

        // no pause after the final step
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_writes_nothing() {
        let sink = MemorySink::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = fade(
            &palette("a", &[("bg", "#000000")]),
            &palette("b", &[("bg", "#ffffff")]),
            &ColorMap::new(),
            &FadeTiming::new(100, 4),
            &cancel,
            &sink,
        )
        .await
        .unwrap();

        assert_eq!(outcome, FadeOutcome::Cancelled);
        assert_eq!(sink.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_at_the_next_step_boundary() {
        let sink = Arc::new(MemorySink::new());
        let cancel = CancelToken::new();
        let task = {
            let sink = Arc::clone(&sink);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                fade(
                    &palette("a", &[("bg", "#000000")]),
                    &palette("b", &[("bg", "#ffffff")]),
                    &ColorMap::new(),
                    &FadeTiming::new(400, 4),
                    &cancel,
                    sink.as_ref(),
                )
                .await
            })
        };

        // steps land at 0ms and 100ms; cancel before the 200ms step
        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap().unwrap(), FadeOutcome::Cancelled);
        assert_eq!(sink.write_count(), 2);
    }
}
