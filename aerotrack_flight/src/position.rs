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
use std::fmt;
use serde::{Serialize, Deserialize};
use uom::si::{f64::Velocity, velocity::{knot, meter_per_second}, length::meter};
use aerotrack_common::{datetime::EpochMillis, geo::GeoPoint, angle::normalize_360};

/// a raw position report as we get it from the receiver. Speed and heading might not be reported
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct RawPosition {
    pub timestamp: EpochMillis,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,                  // meters

    #[serde(default)]
    pub speed: Option<f64>,             // knots

    #[serde(default)]
    pub heading: Option<f64>,           // degrees
}

impl RawPosition {
    pub fn new (timestamp: EpochMillis, latitude: f64, longitude: f64, altitude: f64)->Self {
        RawPosition { timestamp, latitude, longitude, altitude, speed: None, heading: None }
    }

    pub fn with_speed (mut self, speed: f64)->Self { self.speed = Some(speed); self }
    pub fn with_heading (mut self, heading: f64)->Self { self.heading = Some(heading); self }

    pub fn location (&self)->GeoPoint { GeoPoint::from_lon_lat_degrees( self.longitude, self.latitude) }
}

/// a normalized and admitted position. Speed and heading are always set (but might be NaN if derived from degenerate input)
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct PositionUpdate {
    pub timestamp: EpochMillis,
    pub location: GeoPoint,
    pub altitude: f64, // meters
    pub speed: f64,    // knots
    pub heading: f64,  // degrees [0..360)
}

impl PositionUpdate {
    pub fn latitude (&self)->f64 { self.location.latitude_degrees() }
    pub fn longitude (&self)->f64 { self.location.longitude_degrees() }

    #[inline] pub fn is_stationary (&self)->bool { self.speed == 0.0 }
    #[inline] pub fn is_finite (&self)->bool { self.speed.is_finite() && self.heading.is_finite() }
}

impl fmt::Display for PositionUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "PositionUpdate( {}, pos: {}, alt: {:.0}, spd: {:.1}, hdg: {:.0})",
                self.timestamp, self.location, self.altitude, self.speed, self.heading)
    }
}

#[inline]
fn valid_speed (spd: Option<f64>)->Option<f64> { spd.filter( |s| s.is_finite() && *s >= 0.0) }

#[inline]
fn valid_heading (hdg: Option<f64>)->Option<f64> { hdg.filter( |h| h.is_finite()).map( normalize_360) }

/// turn a raw report into a PositionUpdate, deriving missing speed/heading from the preceding admitted position.
/// Returns None if the report is unusable, which is if we have to derive but there is no predecessor or the
/// time elapsed since the predecessor is not positive
pub fn normalize (raw: &RawPosition, previous: Option<&PositionUpdate>)->Option<PositionUpdate> {
    let location = raw.location();
    let timestamp = raw.timestamp;
    let altitude = raw.altitude;

    let (speed, heading) = match (valid_speed(raw.speed), valid_heading(raw.heading)) {
        (Some(speed), Some(heading)) => (speed, heading),
        (speed, heading) => {
            let prev = previous?;
            let dt = timestamp.secs_since( prev.timestamp);
            if dt <= 0.0 { return None }

            let speed = speed.unwrap_or_else( || {
                let dist = prev.location.haversine_distance( &location);
                Velocity::new::<meter_per_second>( dist.get::<meter>() / dt).get::<knot>()
            });
            let heading = heading.unwrap_or_else( || prev.location.bearing_to( &location));
            (speed, heading)
        }
    };

    Some( PositionUpdate { timestamp, location, altitude, speed, heading })
}
