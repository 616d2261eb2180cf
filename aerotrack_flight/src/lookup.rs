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
//! seams for the geospatial providers we do not implement ourselves

use std::sync::{Arc, Mutex};
use serde::{Serialize, Deserialize};
use uom::si::f64::Length;
use aerotrack_common::{angle::rounded_heading, geo::GeoPoint};
use crate::context::FlightContext;

/// a context as it is shared between the factory and other clients
pub type SharedContext = Arc<Mutex<FlightContext>>;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Runway {
    pub designator: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl Runway {
    /// direction from start to end in whole degrees (1..=360)
    pub fn heading (&self)->u16 { rounded_heading( self.start.bearing_to( &self.end)) }
}

pub trait RunwayLookup: Send + Sync {
    fn nearby_runways (&self, location: &GeoPoint, radius: Length)->Vec<Runway>;
}

impl<F> RunwayLookup for F where F: Fn(&GeoPoint,Length)->Vec<Runway> + Send + Sync {
    fn nearby_runways (&self, location: &GeoPoint, radius: Length)->Vec<Runway> { self(location,radius) }
}

/// note the returned contexts are locked by the caller, implementors must not return the context that asks
pub trait AircraftLookup: Send + Sync {
    fn nearby_aircraft (&self, location: &GeoPoint, radius: Length)->Vec<SharedContext>;
}

impl<F> AircraftLookup for F where F: Fn(&GeoPoint,Length)->Vec<SharedContext> + Send + Sync {
    fn nearby_aircraft (&self, location: &GeoPoint, radius: Length)->Vec<SharedContext> { self(location,radius) }
}
