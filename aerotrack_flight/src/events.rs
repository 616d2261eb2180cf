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
use std::{fmt, sync::Arc};
use serde::{Serialize, Deserialize};
use strum::Display;
use tracing::{debug, trace};
use crate::flight::Flight;

#[derive(Serialize,Deserialize,Display,Debug,Clone,Copy,PartialEq,Eq,Hash)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FlightEventKind {
    RadarContact,        // first seen while already airborne
    Takeoff,
    LaunchCompleted,
    Landing,
    CompletedWithErrors, // flight abandoned because of a data gap
}

/// what we publish. The flight is a snapshot taken when the event was emitted
#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct FlightEvent {
    pub kind: FlightEventKind,
    pub aircraft: Arc<String>,
    pub flight: Flight,
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}: {}", self.kind, self.flight)
    }
}

/// a faulted context cascade, reported on the diagnostic channel
#[derive(Debug,Clone)]
pub struct ContextFault {
    pub aircraft: Arc<String>,
    pub reason: String,
}

impl fmt::Display for ContextFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "context fault for {}: {}", self.aircraft, self.reason)
    }
}

/// the sending end of the event channel a context emits into
#[derive(Clone)]
pub struct EventSink {
    tx: kanal::Sender<FlightEvent>,
}

impl EventSink {
    pub fn new (tx: kanal::Sender<FlightEvent>)->Self { EventSink { tx } }

    pub fn emit (&self, kind: FlightEventKind, flight: &Flight) {
        let event = FlightEvent { kind, aircraft: flight.aircraft.clone(), flight: flight.clone() };
        debug!("emit {}", event);

        // unbounded channel, this only fails if there is no receiver left
        if let Err(e) = self.tx.send( event) {
            trace!("dropped {} event for {}: {:?}", kind, flight.aircraft, e);
        }
    }
}

/// create an unbounded event channel
pub fn event_channel ()->(EventSink, kanal::Receiver<FlightEvent>) {
    let (tx,rx) = kanal::unbounded();
    (EventSink::new(tx), rx)
}
