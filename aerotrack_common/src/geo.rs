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
//! a minimal geodetic point type for position reports.
//! We wrap `geo::Point` (x = longitude, y = latitude in degrees) so that we can add the great-circle
//! functions the flight analysis needs, with lengths expressed as `uom` quantities.

use std::fmt;
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use serde::ser::SerializeStruct;
use geo::Point;
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::angle::{normalize_90, normalize_180, normalize_360};

/// mean earth radius in meters (IUGG)
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoPoint(Point);

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint( Point::new( normalize_180(lon), normalize_90(lat)))
    }

    #[inline] pub fn longitude_degrees (&self)->f64 { self.0.x() }
    #[inline] pub fn latitude_degrees (&self)->f64 { self.0.y() }

    /// answer if both points have exactly the same coordinates (no tolerance)
    #[inline] pub fn is_same_location (&self, other: &GeoPoint)->bool {
        self.0.x() == other.0.x() && self.0.y() == other.0.y()
    }

    /// great circle distance based on the haversine formula
    pub fn haversine_distance (&self, other: &GeoPoint)->Length {
        let lat1 = self.latitude_degrees().to_radians();
        let lat2 = other.latitude_degrees().to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude_degrees() - self.longitude_degrees()).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2( (1.0 - a).sqrt());

        Length::new::<meter>( MEAN_EARTH_RADIUS * c)
    }

    /// initial great circle bearing from self towards `other` in [0,360) degrees.
    /// Coincident points yield 0
    pub fn bearing_to (&self, other: &GeoPoint)->f64 {
        let lat1 = self.latitude_degrees().to_radians();
        let lat2 = other.latitude_degrees().to_radians();
        let dlon = (other.longitude_degrees() - self.longitude_degrees()).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

        normalize_360( y.atan2(x).to_degrees())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.0.x(), self.0.y())
    }
}

impl Serialize for GeoPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("GeoPoint", 2)?;
        state.serialize_field("lon", &self.longitude_degrees())?;
        state.serialize_field("lat", &self.latitude_degrees())?;
        state.end()
    }
}

// we accept "lon", "longitude" or "x" (and respective latitude names) so that we can read what `geo` serializes
#[derive(Deserialize)]
struct LonLat {
    #[serde(alias="longitude", alias="x")] lon: f64,
    #[serde(alias="latitude", alias="y")] lat: f64,
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let ll = LonLat::deserialize(deserializer)?;
        Ok( GeoPoint::from_lon_lat_degrees( ll.lon, ll.lat))
    }
}
