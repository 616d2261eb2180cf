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
//! incremental flight phase analysis for streams of aircraft position reports.
//!
//! Raw positions are submitted per aircraft to a [`FlightContextFactory`], which routes them into a per-aircraft
//! [`FlightContext`]. Contexts order, normalize and interpret the positions, and publish [`FlightEvent`]s for
//! radar contact, takeoff, launch completion, landing and flights that had to be abandoned because of data gaps.

pub mod errors;
pub mod position;
pub mod queue;
pub mod zscore;
pub mod launch;
pub mod flight;
pub mod events;
pub mod lookup;
pub mod config;
pub mod context;
pub mod factory;

pub use errors::{FlightAnalysisError, Result};
pub use position::{RawPosition, PositionUpdate, normalize};
pub use flight::Flight;
pub use launch::LaunchMethod;
pub use events::{FlightEvent, FlightEventKind, ContextFault};
pub use lookup::{Runway, RunwayLookup, AircraftLookup, SharedContext};
pub use config::{FlightContextFactoryConfig, FlightContextOptions, load_config};
pub use context::{FlightContext, ContextState};
pub use factory::{FlightContextFactory, lock_context};
