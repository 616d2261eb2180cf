/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
use std::{
    any::Any, cmp::Reverse, collections::BinaryHeap, panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, TryLockError, atomic::{AtomicBool, Ordering}},
};
use dashmap::{DashMap, mapref::entry::Entry};
use tokio::{task::JoinHandle, time::interval};
use tracing::{debug, error, info};
use aerotrack_common::datetime::{millis, Clock, EpochMillis, SystemClock};
use crate::{
    config::{FlightContextFactoryConfig, FlightContextOptions},
    context::FlightContext,
    errors::{FlightAnalysisError, Result},
    events::{ContextFault, EventSink, FlightEvent},
    flight::Flight,
    lookup::{AircraftLookup, RunwayLookup, SharedContext},
    position::RawPosition,
};

/// lock a context, recovering it if a previous holder panicked. Cascade faults are caught while holding the lock
/// and the context is reset, so its state is consistent
pub fn lock_context (ctx: &SharedContext)->MutexGuard<'_,FlightContext> {
    ctx.lock().unwrap_or_else( |poisoned| poisoned.into_inner())
}

fn panic_reason (payload: &(dyn Any + Send))->String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// the owner of all live flight contexts, keyed by aircraft id.
///
/// Contexts are created lazily by [`FlightContextFactory::submit`] and evicted by [`FlightContextFactory::sweep`]
/// once they did not receive positions for the configured `context_expiration`. Eviction is silent - a subsequent
/// position for the same aircraft starts from scratch.
///
/// All methods take `&self` so that the factory can be shared between threads (e.g. in an `Arc`). Submissions for
/// different aircraft run concurrently, submissions for the same aircraft are serialized by the context lock.
pub struct FlightContextFactory {
    config: FlightContextFactoryConfig,
    runway_lookup: Option<Arc<dyn RunwayLookup>>,
    aircraft_lookup: Option<Arc<dyn AircraftLookup>>,
    clock: Arc<dyn Clock>,

    contexts: DashMap<String,SharedContext>,
    expiry: Mutex<BinaryHeap<Reverse<(EpochMillis,Arc<String>)>>>, // one entry per live context

    event_tx: Mutex<Option<kanal::Sender<FlightEvent>>>, // None after close
    event_rx: kanal::Receiver<FlightEvent>,
    fault_tx: kanal::Sender<ContextFault>,
    fault_rx: kanal::Receiver<ContextFault>,

    closed: AtomicBool,
}

impl FlightContextFactory {
    pub fn new (config: FlightContextFactoryConfig)->Self {
        let (event_tx, event_rx) = kanal::unbounded();
        let (fault_tx, fault_rx) = kanal::unbounded();

        FlightContextFactory {
            config,
            runway_lookup: None,
            aircraft_lookup: None,
            clock: Arc::new( SystemClock),
            contexts: DashMap::new(),
            expiry: Mutex::new( BinaryHeap::new()),
            event_tx: Mutex::new( Some(event_tx)),
            event_rx,
            fault_tx,
            fault_rx,
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_clock (mut self, clock: Arc<dyn Clock>)->Self {
        self.clock = clock;
        self
    }

    pub fn with_runway_lookup (mut self, lookup: impl RunwayLookup + 'static)->Self {
        self.runway_lookup = Some( Arc::new(lookup));
        self
    }

    pub fn with_aircraft_lookup (mut self, lookup: impl AircraftLookup + 'static)->Self {
        self.aircraft_lookup = Some( Arc::new(lookup));
        self
    }

    pub fn config (&self)->&FlightContextFactoryConfig { &self.config }

    /// the receiving end of the flight event channel. Each event is delivered to exactly one receiver clone
    pub fn events (&self)->kanal::Receiver<FlightEvent> { self.event_rx.clone() }

    /// the diagnostic channel for contexts that faulted while processing positions
    pub fn faults (&self)->kanal::Receiver<ContextFault> { self.fault_rx.clone() }

    pub fn len (&self)->usize { self.contexts.len() }
    pub fn is_empty (&self)->bool { self.contexts.is_empty() }
    pub fn contains (&self, aircraft: &str)->bool { self.contexts.contains_key( aircraft) }
    pub fn is_closed (&self)->bool { self.closed.load( Ordering::Acquire) }

    /// snapshot of the current flight of the given aircraft
    pub fn flight (&self, aircraft: &str)->Option<Flight> {
        let ctx = self.get_context( aircraft)?;
        let flight = lock_context( &ctx).flight().clone();
        Some(flight)
    }

    pub fn get_context (&self, aircraft: &str)->Option<SharedContext> {
        self.contexts.get( aircraft).map( |e| e.value().clone())
    }

    /// process a raw position for the given aircraft. This creates a new context if there is none for this aircraft.
    /// Faults during processing are not reported here but on the [`FlightContextFactory::faults`] channel
    pub fn submit (&self, aircraft: &str, raw: RawPosition)->Result<()> {
        if self.is_closed() { return Err( FlightAnalysisError::FactoryClosed) }
        let now = self.clock.now();

        loop {
            let ctx = self.get_or_create_context( aircraft, now)?;
            let mut guard = lock_context( &ctx);

            if guard.is_evicted() { continue } // we lost a race against sweep(), retry with a new context

            guard.touch( now);
            let raw = raw.clone();
            self.run_guarded( &mut guard, move |c| c.enqueue( raw));
            return Ok(())
        }
    }

    /// run a client function on the context of the given aircraft while holding its lock. Panics in `f` are
    /// handled like cascade faults. Returns None if there is no such context or `f` did panic
    pub fn with_context<F,R> (&self, aircraft: &str, f: F)->Option<R> where F: FnOnce(&mut FlightContext)->R {
        let ctx = self.get_context( aircraft)?;
        let mut guard = lock_context( &ctx);
        self.run_guarded( &mut guard, f)
    }

    fn run_guarded<F,R> (&self, ctx: &mut FlightContext, f: F)->Option<R> where F: FnOnce(&mut FlightContext)->R {
        match panic::catch_unwind( AssertUnwindSafe( || f(ctx))) {
            Ok(r) => Some(r),
            Err(payload) => {
                let reason = panic_reason( payload.as_ref());
                error!("context {} faulted: {}", ctx.aircraft(), reason);

                ctx.reset_after_fault();
                let fault = ContextFault { aircraft: ctx.aircraft().clone(), reason };
                if self.fault_tx.send( fault).is_err() {
                    debug!("no receiver for context fault");
                }
                None
            }
        }
    }

    fn get_or_create_context (&self, aircraft: &str, now: EpochMillis)->Result<SharedContext> {
        if let Some(ctx) = self.get_context( aircraft) {
            return Ok(ctx)
        }

        let sink = self.event_sink()?;
        let id = Arc::new( aircraft.to_string());
        let (ctx, created) = match self.contexts.entry( aircraft.to_string()) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(e) => {
                let ctx = Arc::new( Mutex::new( FlightContext::new( self.context_options( id.clone()), sink)));
                e.insert( ctx.clone());
                (ctx, true)
            }
        };

        if created { // the map shard is unlocked at this point
            debug!("created context for {}", aircraft);
            self.schedule_expiry( now, id);
        }
        Ok(ctx)
    }

    fn context_options (&self, aircraft: Arc<String>)->FlightContextOptions {
        let mut options = FlightContextOptions::from_config( aircraft, &self.config);
        options.runway_lookup = self.runway_lookup.clone();
        options.aircraft_lookup = self.aircraft_lookup.clone();
        options
    }

    fn event_sink (&self)->Result<EventSink> {
        let tx = self.event_tx.lock().unwrap_or_else( |poisoned| poisoned.into_inner());
        tx.as_ref()
            .map( |tx| EventSink::new( tx.clone()))
            .ok_or( FlightAnalysisError::FactoryClosed)
    }

    fn expiry_heap (&self)->MutexGuard<'_,BinaryHeap<Reverse<(EpochMillis,Arc<String>)>>> {
        self.expiry.lock().unwrap_or_else( |poisoned| poisoned.into_inner())
    }

    fn schedule_expiry (&self, t: EpochMillis, aircraft: Arc<String>) {
        self.expiry_heap().push( Reverse( (t, aircraft)));
    }

    /// pop the oldest expiry entry if it is older than the configured expiration
    fn pop_expired (&self, now: EpochMillis, max_age: i64)->Option<(EpochMillis,Arc<String>)> {
        let mut heap = self.expiry_heap();
        let is_expired = heap.peek().is_some_and( |Reverse((t,_))| now.millis_since(*t) > max_age);
        if is_expired { heap.pop().map( |Reverse(e)| e) } else { None }
    }

    /// evict all idle contexts that did not get positions within the configured expiration.
    /// Returns the number of evicted contexts
    pub fn sweep (&self)->usize {
        let now = self.clock.now();
        let max_age = self.config.context_expiration.as_millis() as i64;
        let mut n_evicted = 0;

        while let Some((_, aircraft)) = self.pop_expired( now, max_age) {
            let Some(ctx) = self.get_context( aircraft.as_str()) else { continue }; // already gone

            let reschedule = match ctx.try_lock() {
                Ok(guard) => self.try_evict( guard, &ctx, now, max_age),
                Err(TryLockError::Poisoned(poisoned)) => self.try_evict( poisoned.into_inner(), &ctx, now, max_age),
                Err(TryLockError::WouldBlock) => Some(now), // busy, so it is not idle
            };

            match reschedule {
                Some(t) => self.schedule_expiry( t, aircraft),
                None => n_evicted += 1
            }
        }

        if n_evicted > 0 {
            info!("evicted {} flight contexts, {} remaining", n_evicted, self.contexts.len());
        }
        n_evicted
    }

    /// evict the locked context if it is expired and idle. Returns the time to re-schedule otherwise
    fn try_evict (&self, mut guard: MutexGuard<'_,FlightContext>, ctx: &SharedContext, now: EpochMillis, max_age: i64)->Option<EpochMillis> {
        let last_activity = guard.last_activity();

        if !guard.is_idle() {
            Some(now)
        } else if now.millis_since( last_activity) <= max_age {
            Some(last_activity)
        } else {
            guard.mark_evicted();
            self.contexts.remove_if( guard.aircraft().as_str(), |_,v| Arc::ptr_eq( v, ctx));
            debug!("evicted context for {} (last activity {})", guard.aircraft(), last_activity);
            None
        }
    }

    /// periodically call sweep() from a tokio task. The task terminates once the factory is dropped or closed
    pub fn spawn_sweeper (self: &Arc<Self>)->JoinHandle<()> {
        let factory = Arc::downgrade( self);
        let period = self.config.sweep_interval.max( millis(1));

        tokio::spawn( async move {
            let mut interval = interval( period);
            interval.tick().await; // the first tick completes immediately

            loop {
                interval.tick().await;

                let Some(factory) = factory.upgrade() else { break };
                if factory.is_closed() { break }
                factory.sweep();
            }
        })
    }

    /// resume all contexts that still have queued positions. Returns the number of resumed contexts
    pub fn flush (&self)->usize {
        let contexts: Vec<SharedContext> = self.contexts.iter().map( |e| e.value().clone()).collect();
        let mut n_resumed = 0;

        for ctx in contexts {
            let mut guard = lock_context( &ctx);
            if guard.queued() > 0 && self.run_guarded( &mut guard, |c| c.resume()).unwrap_or(false) {
                n_resumed += 1;
            }
        }
        n_resumed
    }

    /// flush and drop all contexts. Subscribers can still receive pending events, after which the event channel
    /// is closed. Subsequent submissions fail with [`FlightAnalysisError::FactoryClosed`]
    pub fn close (&self) {
        if self.closed.swap( true, Ordering::AcqRel) { return }

        self.flush();

        let n_contexts = self.contexts.len();
        self.contexts.clear();
        self.expiry_heap().clear();
        self.event_tx.lock().unwrap_or_else( |poisoned| poisoned.into_inner()).take();

        info!("flight context factory closed ({} contexts dropped)", n_contexts);
    }
}

impl Default for FlightContextFactory {
    fn default ()->Self { FlightContextFactory::new( FlightContextFactoryConfig::default()) }
}
