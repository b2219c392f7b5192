use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RotationConfig;
use crate::error::{SinkError, StartError};
use crate::palettes::{load_palettes, ColorMap, Palette};
use crate::partition::{merge_onto, partition};
use crate::sinks::ConfigSink;

use super::cancel::{CancelToken, Wake};
use super::fade::{fade, FadeOutcome, FadeTiming};

/// What `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { palettes: usize },
    AlreadyRunning,
}

/// What `stop` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOutcome {
    pub was_running: bool,
    /// Whether the baseline was written back to the host.
    pub restored: bool,
}

/// Snapshot of the controller for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStatus {
    pub running: bool,
    pub index: usize,
    pub palette_name: Option<String>,
    pub palette_count: usize,
}

/// State of one rotation, replaced wholesale on every `start`.
///
/// `index` is always a valid position in `palettes` while `running`.
#[derive(Debug, Default)]
struct Session {
    running: bool,
    cancel: CancelToken,
    palettes: Arc<Vec<Palette>>,
    index: usize,
    baseline: Arc<ColorMap>,
    animated: BTreeSet<String>,
}

/// Owns the rotation lifecycle: Idle -> Running -> Idle.
///
/// While running, a background task fades from the palette at `index` to the
/// next one, advances the cursor, dwells, and repeats until cancelled.
pub struct RotationController {
    config: RotationConfig,
    sink: Arc<dyn ConfigSink>,
    session: Arc<Mutex<Session>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RotationController {
    pub fn new(config: RotationConfig, sink: Arc<dyn ConfigSink>) -> Self {
        Self {
            config,
            sink,
            session: Arc::new(Mutex::new(Session::default())),
            task: Mutex::new(None),
        }
    }

    /// Load palettes, jump to the first one and launch the background loop.
    ///
    /// Must be called from within a tokio runtime. On error nothing changes.
    pub async fn start(&self) -> Result<StartOutcome, StartError> {
        if lock(&self.session).running {
            info!("rotation already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let palettes = load_palettes(&self.config.folder, &self.config.key_whitelist)?;
        let split = partition(&palettes, &self.sink.read_static()?);
        let cancel = CancelToken::new();
        let count = palettes.len();

        {
            let mut session = lock(&self.session);
            if session.running {
                return Ok(StartOutcome::AlreadyRunning);
            }
            // first visible state is exactly palette 0, no fade
            self.sink
                .apply(&merge_onto(&split.baseline, &palettes[0].colors))?;

            *session = Session {
                running: true,
                cancel: cancel.clone(),
                palettes: Arc::new(palettes),
                index: 0,
                baseline: Arc::new(split.baseline),
                animated: split.animated,
            };
            info!(
                palettes = count,
                animated_keys = session.animated.len(),
                baseline_keys = session.baseline.len(),
                "rotation started"
            );
        }

        if count < 2 {
            debug!("single palette loaded, nothing to rotate");
            return Ok(StartOutcome::Started { palettes: count });
        }

        let handle = tokio::spawn(run_rotation(
            Arc::clone(&self.session),
            Arc::clone(&self.sink),
            self.config.fade_timing(),
            self.config.dwell(),
            cancel,
        ));
        if let Some(previous) = lock(&self.task).replace(handle) {
            previous.abort();
        }
        Ok(StartOutcome::Started { palettes: count })
    }

    /// Cancel the rotation and write the baseline back.
    ///
    /// Waits for the background loop to exit before restoring, so no fade step
    /// can land after the restore. When idle, the last known baseline is still
    /// written if it is non-empty.
    pub async fn stop(&self) -> Result<StopOutcome, SinkError> {
        let (was_running, baseline) = {
            let session = lock(&self.session);
            if session.running {
                session.cancel.cancel();
            }
            (session.running, Arc::clone(&session.baseline))
        };

        let handle = lock(&self.task).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "rotation task ended abnormally");
            }
        }

        if !was_running && baseline.is_empty() {
            return Ok(StopOutcome {
                was_running,
                restored: false,
            });
        }

        {
            let mut session = lock(&self.session);
            // a start() that raced in owns the host config now
            if session.running && !session.cancel.is_cancelled() {
                return Ok(StopOutcome {
                    was_running,
                    restored: false,
                });
            }
            session.running = false;
        }
        self.sink.apply(&baseline)?;
        info!(keys = baseline.len(), "baseline restored");
        Ok(StopOutcome {
            was_running,
            restored: true,
        })
    }

    /// Jump to the next palette immediately, without fading.
    ///
    /// Returns the new index, or `None` when idle or fewer than two palettes
    /// are loaded. The background loop keeps its own timing.
    pub fn advance(&self) -> Result<Option<usize>, SinkError> {
        let mut session = lock(&self.session);
        let count = session.palettes.len();
        if !session.running || count < 2 {
            return Ok(None);
        }

        let next = (session.index + 1) % count;
        let palette = &session.palettes[next];
        self.sink.apply(&merge_onto(&session.baseline, &palette.colors))?;
        info!(palette = %palette.name, index = next, "advanced");
        session.index = next;
        Ok(Some(next))
    }

    pub fn status(&self) -> RotationStatus {
        let session = lock(&self.session);
        RotationStatus {
            running: session.running,
            index: session.index,
            palette_name: session
                .palettes
                .get(session.index)
                .map(|p| p.name.clone()),
            palette_count: session.palettes.len(),
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.session).running
    }

    /// Process teardown hook: flag cancellation without waiting or restoring.
    pub fn shutdown(&self) {
        let session = lock(&self.session);
        if session.running {
            debug!("teardown: cancelling rotation");
            session.cancel.cancel();
        }
    }
}

impl Drop for RotationController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RotationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationController")
            .field("config", &self.config)
            .field("sink", &self.sink.name())
            .field("status", &self.status())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `running` when the loop exits, including by panic, unless a newer
/// session has taken over.
struct RunningGuard {
    session: Arc<Mutex<Session>>,
    cancel: CancelToken,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut session = lock(&self.session);
        if session.cancel.same_as(&self.cancel) {
            session.running = false;
        }
    }
}

/// One leg of the rotation: fade from `from` to `to`.
struct Leg {
    palettes: Arc<Vec<Palette>>,
    baseline: Arc<ColorMap>,
    from: usize,
    to: usize,
}

async fn run_rotation(
    session: Arc<Mutex<Session>>,
    sink: Arc<dyn ConfigSink>,
    timing: FadeTiming,
    dwell: Option<Duration>,
    cancel: CancelToken,
) {
    let _guard = RunningGuard {
        session: Arc::clone(&session),
        cancel: cancel.clone(),
    };
    match rotate(&session, sink.as_ref(), &timing, dwell, &cancel).await {
        Ok(()) => debug!("rotation loop exited"),
        Err(err) => error!(error = %err, "rotation stopped after a failed write"),
    }
}

async fn rotate(
    session: &Mutex<Session>,
    sink: &dyn ConfigSink,
    timing: &FadeTiming,
    dwell: Option<Duration>,
    cancel: &CancelToken,
) -> Result<(), SinkError> {
    loop {
        let Some(leg) = next_leg(session, cancel) else {
            return Ok(());
        };

        let from = &leg.palettes[leg.from];
        let to = &leg.palettes[leg.to];
        if fade(from, to, &leg.baseline, timing, cancel, sink).await? == FadeOutcome::Cancelled {
            return Ok(());
        }

        {
            let mut session = lock(session);
            // an advance() during the fade already moved the cursor; keep it
            if session.cancel.same_as(cancel) && session.index == leg.from {
                session.index = leg.to;
            }
        }

        if let Some(dwell) = dwell {
            if cancel.sleep(dwell).await == Wake::Cancelled {
                return Ok(());
            }
        }
    }
}

fn next_leg(session: &Mutex<Session>, cancel: &CancelToken) -> Option<Leg> {
    let session = lock(session);
    if cancel.is_cancelled() || !session.cancel.same_as(cancel) || session.palettes.is_empty() {
        return None;
    }
    let from = session.index;
    Some(Leg {
        palettes: Arc::clone(&session.palettes),
        baseline: Arc::clone(&session.baseline),
        from,
        to: (from + 1) % session.palettes.len(),
    })
}
