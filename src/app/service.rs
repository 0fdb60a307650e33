//! Prop service: wires the engine, timers and worker threads together.
//!
//! ```text
//!  SwitchSensor ──edges──▶ "lid-watch" ──stimulate──▶ ┌──────────────┐
//!                                                     │ StateMachine │
//!  "timer-queue" ───────────────────────stimulate───▶ │              │
//!                                                     └──────┬───────┘
//!                                                            │ wait
//!  ArmActuator ◀──────────── "orchestrator" ◀────────────────┤
//!                                                            │
//!  main thread (observer) ◀──────────────────────────────────┘
//! ```
//!
//! The main thread keeps its own observer so it can block until the
//! machine has fully shut down.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use crate::config::PropConfig;
use crate::error::Error;
use crate::fsm::{Action, ObserverId, State, StateMachine};
use crate::scheduler::{TimerQueue, TimerWorker};
use crate::shutdown::ShutdownSignal;

use super::lid::LidMonitor;
use super::orchestrator::Orchestrator;
use super::ports::{ArmActuator, EventSink, SwitchSensor};

// ───────────────────────────────────────────────────────────────
// PropService
// ───────────────────────────────────────────────────────────────

/// A running prop.  Call [`shutdown`](Self::shutdown) (or
/// [`run_until`](Self::run_until)) to stop it cleanly.
pub struct PropService {
    fsm: Arc<StateMachine>,
    timers: TimerQueue,
    timer_worker: TimerWorker,
    main_id: ObserverId,
    orchestrator: JoinHandle<Result<(), Error>>,
    watcher: Option<JoinHandle<()>>,
}

impl PropService {
    /// Power the prop up and start every worker thread.
    pub fn start<A, S, E>(config: PropConfig, arm: A, sensor: S, sink: E) -> Result<Self, Error>
    where
        A: ArmActuator + 'static,
        S: SwitchSensor + 'static,
        E: EventSink + Send + 'static,
    {
        Self::start_with(config, arm, sensor, sink, |body| {
            thread::Builder::new().name("lid-watch".into()).spawn(body)
        })
    }

    /// [`start`](Self::start) with the lid watcher thread created by
    /// `spawn_watcher`.
    pub(crate) fn start_with<A, S, E, W>(
        config: PropConfig,
        arm: A,
        mut sensor: S,
        sink: E,
        spawn_watcher: W,
    ) -> Result<Self, Error>
    where
        A: ArmActuator + 'static,
        S: SwitchSensor + 'static,
        E: EventSink + Send + 'static,
        W: FnOnce(Box<dyn FnOnce() + Send>) -> io::Result<JoinHandle<()>>,
    {
        config.validate()?;

        let fsm = Arc::new(StateMachine::new());
        let main_id = fsm.register()?;

        let (timers, timer_worker) = TimerQueue::spawn(fsm.clone(), config.timer_capacity)?;

        let edges = sensor.edges();
        let lid = Arc::new(LidMonitor::new(sensor, config.forward_overrun()));
        let poll = config.edge_poll();

        let orchestrator = match Orchestrator::new(
            Arc::clone(&fsm),
            timers.clone(),
            Arc::clone(&lid),
            arm,
            sink,
            config,
        ) {
            Ok(o) => o,
            Err(e) => {
                timers.stop();
                timer_worker.join();
                return Err(e.into());
            }
        };

        let orchestrator = match thread::Builder::new()
            .name("orchestrator".into())
            .spawn(move || orchestrator.run().map(|_| ()))
        {
            Ok(handle) => handle,
            Err(_) => {
                timers.stop();
                timer_worker.join();
                return Err(Error::Spawn("orchestrator"));
            }
        };

        let mut service = Self {
            fsm,
            timers,
            timer_worker,
            main_id,
            orchestrator,
            watcher: None,
        };

        match edges {
            Some(edges) => {
                let fsm = Arc::clone(&service.fsm);
                match spawn_watcher(Box::new(move || lid.watch(&edges, &fsm, poll))) {
                    Ok(handle) => service.watcher = Some(handle),
                    Err(e) => {
                        error!("Service: could not start lid watcher: {e}");
                        if let Err(e) = service.shutdown() {
                            warn!("Service: unwinding partial start: {e}");
                        }
                        return Err(Error::Spawn("lid-watch"));
                    }
                }
            }
            None => {
                warn!("Service: sensor has no edge source, lid sampled at powerup only");
            }
        }

        info!("Service: started");
        Ok(service)
    }

    pub fn fsm(&self) -> &Arc<StateMachine> {
        &self.fsm
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn state(&self) -> State {
        self.fsm.current_state()
    }

    /// Block until `signal` fires, then shut down.
    pub fn run_until(self, signal: &ShutdownSignal) -> Result<(), Error> {
        signal.wait();
        info!("Service: shutdown signal received");
        self.shutdown()
    }

    /// Request shutdown, wait for the machine to reach `Shutdown` and join
    /// every worker.
    pub fn shutdown(self) -> Result<(), Error> {
        self.fsm.stimulate(Action::Shutdown);

        // Without a live orchestrator nobody would confirm the shutdown.
        if self.orchestrator.is_finished() {
            warn!("Service: orchestrator already gone, completing shutdown");
            self.fsm.stimulate(Action::ShutdownDone);
        }

        loop {
            let state = self.fsm.wait_state_change(self.main_id)?;
            if state == State::Shutdown {
                break;
            }
        }
        self.fsm.deregister(self.main_id)?;

        let result = match self.orchestrator.join() {
            Ok(result) => result,
            Err(_) => Err(Error::Panicked("orchestrator")),
        };

        self.timers.stop();
        self.timer_worker.join();

        if let Some(watcher) = self.watcher {
            if watcher.join().is_err() {
                error!("Service: lid watcher panicked");
            }
        }

        info!("Service: clean exit");
        result
    }
}
