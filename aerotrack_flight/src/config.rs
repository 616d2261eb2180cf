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
use std::{fmt, fs, path::Path, sync::Arc, time::Duration};
use serde::{Serialize, Deserialize, de::DeserializeOwned};
use chrono::TimeDelta;
use aerotrack_common::datetime::{deserialize_duration, serialize_duration};
use crate::{
    errors::{config_error, FlightAnalysisError, Result},
    lookup::{AircraftLookup, RunwayLookup},
};

pub const DEFAULT_CONTEXT_EXPIRATION: Duration = Duration::from_secs(3600);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_MIN_REQUIRED_POSITION_UPDATES: usize = 5;

fn default_context_expiration ()->Duration { DEFAULT_CONTEXT_EXPIRATION }
fn default_sweep_interval ()->Duration { DEFAULT_SWEEP_INTERVAL }
fn default_min_required_position_updates ()->usize { DEFAULT_MIN_REQUIRED_POSITION_UPDATES }

/// the serializable part of the context factory configuration
#[derive(Deserialize,Serialize,Debug,Clone,PartialEq)]
pub struct FlightContextFactoryConfig {
    /// contexts that did not get new positions for this long are evicted
    #[serde(default="default_context_expiration", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub context_expiration: Duration,

    #[serde(default="default_sweep_interval", deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub sweep_interval: Duration,

    /// only keep a trailing window of positions per flight. Event snapshots will not contain the full flight
    #[serde(default)]
    pub minify_memory_pressure: bool,

    /// number of heading samples needed to resolve departure/arrival headings
    #[serde(default="default_min_required_position_updates")]
    pub min_required_position_updates: usize,
}

impl FlightContextFactoryConfig {
    /// negative expirations are turned into their absolute value
    pub fn new (context_expiration: Option<TimeDelta>, minify_memory_pressure: bool)->Self {
        let context_expiration = context_expiration
            .and_then( |d| d.abs().to_std().ok())
            .unwrap_or( DEFAULT_CONTEXT_EXPIRATION);

        FlightContextFactoryConfig {
            context_expiration,
            minify_memory_pressure,
            ..Default::default()
        }
    }

    pub fn with_min_required_position_updates (mut self, n: usize)->Self {
        self.min_required_position_updates = n;
        self
    }

    pub fn with_sweep_interval (mut self, d: Duration)->Self {
        self.sweep_interval = d;
        self
    }

    pub fn check (&self)->Result<()> {
        if self.min_required_position_updates == 0 {
            return Err( config_error!("min_required_position_updates has to be > 0"))
        }
        if self.sweep_interval.is_zero() {
            return Err( config_error!("sweep_interval has to be > 0"))
        }
        Ok(())
    }
}

impl Default for FlightContextFactoryConfig {
    fn default ()->Self {
        FlightContextFactoryConfig {
            context_expiration: DEFAULT_CONTEXT_EXPIRATION,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            minify_memory_pressure: false,
            min_required_position_updates: DEFAULT_MIN_REQUIRED_POSITION_UPDATES,
        }
    }
}

/// load a RON config file
pub fn load_config<C: DeserializeOwned> (path: impl AsRef<Path>)->Result<C> {
    let input = fs::read_to_string( path.as_ref())?;
    Ok( ron::from_str( &input)? )
}

/// what a single context needs to know. This is created by the factory for each new context
#[derive(Clone)]
pub struct FlightContextOptions {
    pub aircraft: Arc<String>,
    pub minify_memory_pressure: bool,
    pub min_required_position_updates: usize,
    pub runway_lookup: Option<Arc<dyn RunwayLookup>>,
    pub aircraft_lookup: Option<Arc<dyn AircraftLookup>>,
}

impl FlightContextOptions {
    pub fn new (aircraft: impl ToString)->Self {
        FlightContextOptions {
            aircraft: Arc::new( aircraft.to_string()),
            minify_memory_pressure: false,
            min_required_position_updates: DEFAULT_MIN_REQUIRED_POSITION_UPDATES,
            runway_lookup: None,
            aircraft_lookup: None,
        }
    }

    pub fn from_config (aircraft: Arc<String>, config: &FlightContextFactoryConfig)->Self {
        FlightContextOptions {
            aircraft,
            minify_memory_pressure: config.minify_memory_pressure,
            min_required_position_updates: config.min_required_position_updates.max(1),
            runway_lookup: None,
            aircraft_lookup: None,
        }
    }

    pub fn with_minify_memory_pressure (mut self, minify: bool)->Self {
        self.minify_memory_pressure = minify;
        self
    }
}

impl fmt::Debug for FlightContextOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightContextOptions")
            .field("aircraft", &self.aircraft)
            .field("minify_memory_pressure", &self.minify_memory_pressure)
            .field("min_required_position_updates", &self.min_required_position_updates)
            .field("runway_lookup", &self.runway_lookup.is_some())
            .field("aircraft_lookup", &self.aircraft_lookup.is_some())
            .finish()
    }
}
