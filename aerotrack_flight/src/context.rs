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
//! the per-aircraft flight state machine
//!
//! A [`FlightContext`] owns the current [`Flight`] of one aircraft, the queue of not yet processed positions and the
//! watermark of the latest processed timestamp. Incoming positions are interpreted by a small state machine with
//! an explicit transition table. Triggers that are fired from within a handler are queued and executed in firing
//! order once the handler returns, so that a cascade runs iteratively (without growing the stack) until either
//! no trigger is pending or the context became `Idle`.
//!
//! Contexts do not synchronize internally. Concurrent access has to be serialized by the owner, which for the
//! [`crate::factory::FlightContextFactory`] is a per-context mutex.

use std::{collections::VecDeque, fmt, sync::Arc, time::Duration};
use strum::Display;
use tracing::{debug, trace, warn};
use uom::si::f64::Length;
use aerotrack_common::datetime::{EpochMillis, hours, minutes};
use crate::{
    config::FlightContextOptions,
    events::{EventSink, FlightEventKind},
    flight::{mean_heading, Flight, MINIFIED_POSITION_WINDOW},
    launch::{classify_launch, LaunchMethod},
    lookup::{Runway, SharedContext},
    position::{normalize, PositionUpdate, RawPosition},
    queue::IngestionQueue,
};

/// speed (in knots) above which we consider an aircraft to be departing
pub const DEPARTURE_SPEED: f64 = 30.0;

/// a point this far away from the watermark terminates the current flight
pub const MAX_WATERMARK_GAP: Duration = hours(8);

/// how long we keep positions before a flight has started
pub const PRE_DEPARTURE_WINDOW: Duration = minutes(2);

#[derive(Display,Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum ContextState {
    Seeding,   // no flight or flight was just reset
    Consuming, // processing queued positions
    Idle,      // queue is empty
}

#[derive(Debug,Clone,Copy,PartialEq)]
enum Trigger {
    Reset { watermark: Option<EpochMillis> },
    Next,
    Standby,
    ResolveState,
    FirstContact,
    ResolveDeparture,
    ResolveArrival,
    ResolveLaunchMethod,
}

/// the handler that gets executed as the effect of a transition
#[derive(Debug,Clone,Copy,PartialEq)]
enum Action {
    Initialize(Option<EpochMillis>),
    ProcessNextPoint,
    EnterIdle,
    DetermineFlightState,
    FirstContact,
    FindDepartureHeading,
    FindArrivalHeading,
    DetermineLaunchMethod,
}

/// the transition table. Returns None for (state,trigger) combinations that are ignored
fn transition (state: ContextState, trigger: Trigger)->Option<(ContextState,Action)> {
    use ContextState::*;

    match (state, trigger) {
        (_, Trigger::Reset{watermark})                  => Some( (Seeding, Action::Initialize(watermark)) ),

        (Seeding | Consuming | Idle, Trigger::Next)     => Some( (Consuming, Action::ProcessNextPoint) ),
        (Consuming, Trigger::Standby)                   => Some( (Idle, Action::EnterIdle) ),

        (Consuming, Trigger::ResolveState)              => Some( (Consuming, Action::DetermineFlightState) ),
        (Consuming, Trigger::FirstContact)              => Some( (Consuming, Action::FirstContact) ),
        (Consuming, Trigger::ResolveDeparture)          => Some( (Consuming, Action::FindDepartureHeading) ),
        (Consuming, Trigger::ResolveArrival)            => Some( (Consuming, Action::FindArrivalHeading) ),
        (Consuming, Trigger::ResolveLaunchMethod)       => Some( (Consuming, Action::DetermineLaunchMethod) ),

        _ => None
    }
}

pub struct FlightContext {
    options: FlightContextOptions,
    sink: EventSink,

    state: ContextState,
    pending: VecDeque<Trigger>,

    flight: Flight,
    queue: IngestionQueue,
    watermark: Option<EpochMillis>,
    current: Option<PositionUpdate>, // the position admitted in the current consume step
    fresh_flight: bool,              // no position admitted yet since the flight was created

    last_activity: EpochMillis,
    evicted: bool,
}

impl FlightContext {
    pub fn new (options: FlightContextOptions, sink: EventSink)->Self {
        let flight = Flight::new( options.aircraft.clone());

        FlightContext {
            options,
            sink,
            state: ContextState::Seeding,
            pending: VecDeque::new(),
            flight,
            queue: IngestionQueue::new(),
            watermark: None,
            current: None,
            fresh_flight: true,
            last_activity: EpochMillis::default(),
            evicted: false,
        }
    }

    //--- accessors

    pub fn aircraft (&self)->&Arc<String> { &self.options.aircraft }
    pub fn options (&self)->&FlightContextOptions { &self.options }
    pub fn state (&self)->ContextState { self.state }
    pub fn is_idle (&self)->bool { self.state == ContextState::Idle }
    pub fn flight (&self)->&Flight { &self.flight }
    pub fn watermark (&self)->Option<EpochMillis> { self.watermark }
    pub fn queued (&self)->usize { self.queue.len() }
    pub fn last_position (&self)->Option<&PositionUpdate> { self.current.as_ref().or( self.flight.last_position()) }

    pub fn last_activity (&self)->EpochMillis { self.last_activity }
    pub fn touch (&mut self, now: EpochMillis) { self.last_activity = now; }

    pub fn is_evicted (&self)->bool { self.evicted }
    pub fn mark_evicted (&mut self) { self.evicted = true; }

    //--- the external operations

    /// add a raw position to the queue and run the state machine until it becomes idle
    pub fn enqueue (&mut self, raw: RawPosition) {
        self.queue.enqueue( raw);
        self.resume();
    }

    /// continue processing queued positions if the context is not already doing so. Answers if a cascade was run
    pub fn resume (&mut self)->bool {
        match self.state {
            ContextState::Seeding => { self.run( Trigger::Reset{ watermark: self.watermark }); true }
            ContextState::Idle => { self.run( Trigger::Next); true }
            ContextState::Consuming => false
        }
    }

    /// get back into a consistent state after a cascade was aborted. Queued positions are kept and will be
    /// processed by the next submission or flush
    pub fn reset_after_fault (&mut self) {
        self.pending.clear();
        self.queue.reset_admissions();
        self.flight = Flight::new( self.options.aircraft.clone());
        self.watermark = None;
        self.current = None;
        self.fresh_flight = true;

        // only queued positions need a resume, an empty context is idle
        self.state = if self.queue.is_empty() { ContextState::Idle } else { ContextState::Seeding };
    }

    /// runways close to the latest position of this aircraft
    pub fn nearby_runways (&self, radius: Length)->Vec<Runway> {
        match (&self.options.runway_lookup, self.last_position()) {
            (Some(lookup), Some(p)) => lookup.nearby_runways( &p.location, radius),
            _ => Vec::new()
        }
    }

    /// other aircraft contexts close to the latest position of this aircraft
    pub fn nearby_aircraft (&self, radius: Length)->Vec<SharedContext> {
        match (&self.options.aircraft_lookup, self.last_position()) {
            (Some(lookup), Some(p)) => lookup.nearby_aircraft( &p.location, radius),
            _ => Vec::new()
        }
    }

    //--- the state machine driver

    fn fire (&mut self, trigger: Trigger) {
        self.pending.push_back( trigger);
    }

    fn run (&mut self, trigger: Trigger) {
        self.fire( trigger);

        while let Some(trigger) = self.pending.pop_front() {
            if let Some((next_state, action)) = transition( self.state, trigger) {
                self.state = next_state;
                self.execute( action);
            } else {
                trace!("{} ignored {:?} in state {}", self.options.aircraft, trigger, self.state);
            }
        }
    }

    fn execute (&mut self, action: Action) {
        match action {
            Action::Initialize(watermark) => self.initialize( watermark),
            Action::ProcessNextPoint => self.process_next_point(),
            Action::EnterIdle => {}
            Action::DetermineFlightState => self.determine_flight_state(),
            Action::FirstContact => self.first_contact(),
            Action::FindDepartureHeading => self.find_departure_heading(),
            Action::FindArrivalHeading => self.find_arrival_heading(),
            Action::DetermineLaunchMethod => self.determine_launch_method(),
        }
    }

    fn emit (&self, kind: FlightEventKind) {
        self.sink.emit( kind, &self.flight);
    }

    //--- the handlers

    fn initialize (&mut self, watermark: Option<EpochMillis>) {
        self.flight = Flight::new( self.options.aircraft.clone());
        self.queue.reset_admissions();
        self.watermark = watermark;
        self.current = None;
        self.fresh_flight = true;

        self.fire( Trigger::Next);
    }

    fn process_next_point (&mut self) {
        if self.queue.is_empty() {
            self.fire( Trigger::Standby);
            return
        }

        if self.flight.is_completed() {
            self.fire( Trigger::Reset{ watermark: None });
            return
        }

        let Some(raw) = self.queue.dequeue() else { return self.fire( Trigger::Standby) };

        if self.queue.is_recent_duplicate( &raw) {
            trace!("{} dropped duplicate position at {}", self.options.aircraft, raw.timestamp);
            self.fire( Trigger::Next);
            return
        }

        let Some(p) = normalize( &raw, self.flight.predecessor_of( raw.timestamp)).filter( |p| p.is_finite()) else {
            trace!("{} dropped unusable position at {}", self.options.aircraft, raw.timestamp);
            self.fire( Trigger::Next);
            return
        };

        if let Some(watermark) = self.watermark {
            if (p.timestamp.millis_since( watermark)).unsigned_abs() > MAX_WATERMARK_GAP.as_millis() as u64 {
                warn!("{} gap of {}s to watermark, terminating {}", self.options.aircraft, p.timestamp.secs_since(watermark), self.flight);
                self.emit( FlightEventKind::CompletedWithErrors);
                self.fire( Trigger::Reset{ watermark: Some(p.timestamp) });
                return
            }
        }

        if self.flight.start_time.is_some_and( |start| p.timestamp < start) {
            trace!("{} dropped late position at {} before departure", self.options.aircraft, p.timestamp);
            self.fire( Trigger::Next);
            return
        }

        self.admit( p);
        self.watermark = Some( self.watermark.map_or( p.timestamp, |w| w.max( p.timestamp)));

        if self.fresh_flight {
            self.fresh_flight = false;
            if p.speed > DEPARTURE_SPEED {
                self.fire( Trigger::FirstContact);
            }
        }

        self.fire( Trigger::ResolveState);
    }

    fn admit (&mut self, p: PositionUpdate) {
        self.flight.insert( p);
        self.queue.record_admitted( &p);
        self.current = Some(p);

        let prune_time = self.flight.start_time.unwrap_or_else( || p.timestamp - PRE_DEPARTURE_WINDOW);
        self.flight.prune_before( prune_time);

        if self.options.minify_memory_pressure {
            self.flight.retain_trailing( MINIFIED_POSITION_WINDOW);
        }
    }

    fn determine_flight_state (&mut self) {
        let Some(p) = self.current else { return self.fire( Trigger::Next) };

        if p.is_stationary() {
            if self.flight.start_time.is_some() || self.flight.departure_info_found == Some(false) {
                if self.flight.set_end_time( p.timestamp) {
                    self.fire( Trigger::ResolveArrival);
                }
            }
            self.fire( Trigger::Next);
            return
        }

        if self.flight.start_time.is_none() && p.speed > DEPARTURE_SPEED && self.flight.departure_info_found != Some(false) {
            match self.flight.find_departure_point( p.timestamp) {
                Some(start) => {
                    self.flight.departure_info_found = Some(true);
                    self.flight.start_time = Some(start);
                    self.flight.prune_before( start);
                    debug!("{} started at {}", self.options.aircraft, start);
                }
                None => {
                    self.flight.departure_info_found = Some(false);
                    self.emit( FlightEventKind::RadarContact);
                }
            }
        }

        if self.flight.start_time.is_some() && self.flight.departure_heading.is_none() {
            self.fire( Trigger::ResolveDeparture);
        } else if self.flight.departure_info_found == Some(true) && self.flight.launch_method == LaunchMethod::Unknown {
            self.fire( Trigger::ResolveLaunchMethod);
        }

        self.fire( Trigger::Next);
    }

    /// the very first position of a flight already shows departure speed
    fn first_contact (&mut self) {
        let Some(p) = self.current else { return };

        if let Some(start) = self.flight.find_departure_point( p.timestamp) {
            self.flight.departure_info_found = Some(true);
            self.flight.start_time = Some(start);
            self.flight.prune_before( start);
        }
        self.emit( FlightEventKind::Takeoff);
    }

    fn find_departure_heading (&mut self) {
        let n = self.options.min_required_position_updates;

        if let Some(samples) = self.flight.departure_heading_samples( n) {
            let heading = mean_heading( &samples);
            let location = samples[0].location;

            self.flight.departure_heading = Some(heading);
            self.flight.departure_location = Some(location);
            self.emit( FlightEventKind::Takeoff);
        }
    }

    fn find_arrival_heading (&mut self) {
        let n = self.options.min_required_position_updates;
        let samples = self.flight.arrival_heading_samples( n);

        if let Some(latest) = samples.first() {
            let heading = mean_heading( &samples);
            let location = latest.location;

            self.flight.arrival_info_found = Some(true);
            self.flight.arrival_heading = Some(heading);
            self.flight.arrival_location = Some(location);
            self.emit( FlightEventKind::Landing);
        }
    }

    fn determine_launch_method (&mut self) {
        if let Some(LaunchMethod::Winch) = classify_launch( self.flight.position_updates.iter()) {
            if self.flight.set_launch_method( LaunchMethod::Winch) {
                self.emit( FlightEventKind::LaunchCompleted);
            }
        }
    }
}

impl fmt::Debug for FlightContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightContext")
            .field("aircraft", &self.options.aircraft)
            .field("state", &self.state)
            .field("queued", &self.queue.len())
            .field("watermark", &self.watermark)
            .field("flight", &self.flight)
            .finish()
    }
}
