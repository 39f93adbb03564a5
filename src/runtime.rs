//! Board bring-up.
//!
//! Turns an [`ExpanderConfig`] into a running registry: validates the
//! config, sizes the arena and, on dual-core builds, starts the worker
//! loop on the second core and hands back the control-side link.
//!
//! ```text
//!  ExpanderConfig ──▶ bring_up() ──▶ Expander { registry, arena, worker }
//!                        │
//!                        └─ DualCore: spawn_worker() ─▶ WorkerCore::run on Core::App
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use log::info;

use crate::adapters::time::MonotonicClock;
use crate::app::ports::{CustomDevice, EventSink};
use crate::app::service::DeviceRegistry;
use crate::arena::Arena;
use crate::config::{DispatchMode, ExpanderConfig};
use crate::dispatch::fifo::{ChannelFifo, fifo_pair};
use crate::dispatch::link::CoreLink;
use crate::dispatch::mailbox::PayloadMailbox;
use crate::dispatch::{Dispatcher, LocalDispatch};
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::DispatchError;
use crate::protocol::Payload;
use crate::slots::SharedPool;
use crate::worker::{WorkerCore, WorkerSettings};

/// Control-side link used on the board.
pub type BoardLink = CoreLink<ChannelFifo, MonotonicClock>;

/// Dispatcher picked at bring-up from [`DispatchMode`].
pub enum PlatformDispatch {
    Local(LocalDispatch),
    CoreLink(BoardLink),
}

impl<D: CustomDevice + Default> Dispatcher<D> for PlatformDispatch {
    fn dispatch(
        &mut self,
        pool: &SharedPool<D>,
        index: usize,
        message_id: i16,
        payload: Payload,
    ) -> Result<(), DispatchError> {
        match self {
            Self::Local(d) => d.dispatch(pool, index, message_id, payload),
            Self::CoreLink(d) => Dispatcher::<D>::dispatch(d, pool, index, message_id, payload),
        }
    }

    fn updates_locally(&self) -> bool {
        match self {
            Self::Local(d) => Dispatcher::<D>::updates_locally(d),
            Self::CoreLink(d) => Dispatcher::<D>::updates_locally(d),
        }
    }

    fn stop_updates(&mut self, stop: bool) -> Result<(), DispatchError> {
        match self {
            Self::Local(d) => Dispatcher::<D>::stop_updates(d, stop),
            Self::CoreLink(d) => Dispatcher::<D>::stop_updates(d, stop),
        }
    }
}

/// Everything the control core needs after bring-up.
pub struct Expander<D, S> {
    pub registry: DeviceRegistry<D, PlatformDispatch, S>,
    pub arena: Arena,
    /// Worker thread handle (dual-core only). The loop never returns.
    pub worker: Option<JoinHandle<()>>,
}

/// Start the worker loop on [`Core::App`] and return the control-side link.
pub fn spawn_worker<D>(
    config: &ExpanderConfig,
    pool: SharedPool<D>,
) -> Result<(BoardLink, JoinHandle<()>)>
where
    D: CustomDevice + Default + Send + 'static,
{
    let (control_end, worker_end) = fifo_pair();
    let mailbox = Arc::new(PayloadMailbox::new());
    let settings = WorkerSettings {
        device_has_update: config.device_has_update,
        poll_interval_ms: config.worker_poll_interval_ms,
    };

    let worker = WorkerCore::new(
        pool,
        worker_end,
        Arc::clone(&mailbox),
        MonotonicClock::new(),
        settings,
    );
    let handle = spawn_on_core::<()>(
        Core::App,
        config.worker_priority,
        config.worker_stack_kb,
        "dev-worker\0",
        move || worker.run(),
    )
    .context("spawning device worker")?;

    let link = CoreLink::new(
        control_end,
        mailbox,
        MonotonicClock::new(),
        config.handshake_timeout_ms,
    );
    Ok((link, handle))
}

/// Validate `config` and assemble the registry for the configured mode.
pub fn bring_up<D, S>(config: &ExpanderConfig, sink: S) -> Result<Expander<D, S>>
where
    D: CustomDevice + Default + Send + 'static,
    S: EventSink,
{
    config.validate().context("invalid expander config")?;

    let pool = SharedPool::<D>::default();
    let (dispatch, worker) = match config.mode {
        DispatchMode::SingleCore => (PlatformDispatch::Local(LocalDispatch::new()), None),
        DispatchMode::DualCore => {
            let (link, handle) = spawn_worker(config, pool.clone())?;
            (PlatformDispatch::CoreLink(link), Some(handle))
        }
    };

    info!(
        "Expander up: {:?}, arena {} B, handshake timeout {:?}",
        config.mode, config.arena_bytes, config.handshake_timeout_ms
    );

    Ok(Expander {
        registry: DeviceRegistry::new(pool, dispatch, sink),
        arena: Arena::new(config.arena_bytes),
        worker,
    })
}
