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
use std::{collections::VecDeque, fmt, sync::Arc};
use serde::{Serialize, Deserialize};
use aerotrack_common::{
    angle::{is_heading_sample, rounded_heading}, collections::{drain_front_while, insert_sorted_by_key, truncate_front},
    datetime::EpochMillis, geo::GeoPoint, mean, is_none
};
use crate::{launch::LaunchMethod, position::PositionUpdate};

/// number of trailing position updates we keep per flight if we minimize memory pressure. This has to cover
/// the climb rate window of the launch classifier
pub const MINIFIED_POSITION_WINDOW: usize = 30;

/// the reconstructed record of one (continuous) flight of one aircraft
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Flight {
    pub aircraft: Arc<String>,

    pub position_updates: VecDeque<PositionUpdate>, // always sorted by timestamp

    #[serde(skip_serializing_if="is_none")] pub start_time: Option<EpochMillis>,
    #[serde(skip_serializing_if="is_none")] pub end_time: Option<EpochMillis>,

    #[serde(skip_serializing_if="is_none")] pub departure_heading: Option<u16>,
    #[serde(skip_serializing_if="is_none")] pub departure_location: Option<GeoPoint>,
    pub departure_info_found: Option<bool>, // None means we don't know yet

    #[serde(skip_serializing_if="is_none")] pub arrival_heading: Option<u16>,
    #[serde(skip_serializing_if="is_none")] pub arrival_location: Option<GeoPoint>,
    pub arrival_info_found: Option<bool>,

    pub launch_method: LaunchMethod,
}

impl Flight {
    pub fn new (aircraft: Arc<String>)->Self {
        Flight {
            aircraft,
            position_updates: VecDeque::new(),
            start_time: None,
            end_time: None,
            departure_heading: None,
            departure_location: None,
            departure_info_found: None,
            arrival_heading: None,
            arrival_location: None,
            arrival_info_found: None,
            launch_method: LaunchMethod::Unknown,
        }
    }

    #[inline] pub fn is_completed (&self)->bool { self.end_time.is_some() }

    pub fn len (&self)->usize { self.position_updates.len() }
    pub fn is_empty (&self)->bool { self.position_updates.is_empty() }

    pub fn last_position (&self)->Option<&PositionUpdate> { self.position_updates.back() }

    /// the admitted position that immediately precedes (or has the same time as) the given timestamp
    pub fn predecessor_of (&self, t: EpochMillis)->Option<&PositionUpdate> {
        let idx = self.position_updates.partition_point( |p| p.timestamp <= t);
        if idx > 0 { self.position_updates.get(idx-1) } else { None }
    }

    /// add a position update, keeping position_updates sorted. Returns the index of the new position
    pub fn insert (&mut self, p: PositionUpdate)->usize {
        insert_sorted_by_key( &mut self.position_updates, p, |p| p.timestamp)
    }

    /// remove all positions that are strictly older than `t`
    pub fn prune_before (&mut self, t: EpochMillis)->usize {
        drain_front_while( &mut self.position_updates, |p| p.timestamp < t)
    }

    pub fn retain_trailing (&mut self, max_len: usize)->usize {
        truncate_front( &mut self.position_updates, max_len)
    }

    /// most recent position before `t` that was stationary or has no usable speed. This is where
    /// a flight that is at departure speed at `t` has started
    pub fn find_departure_point (&self, t: EpochMillis)->Option<EpochMillis> {
        self.position_updates.iter().rev()
            .filter( |p| p.timestamp < t)
            .find( |p| p.speed == 0.0 || p.speed.is_nan())
            .map( |p| p.timestamp)
    }

    /// the `n` earliest positions with a heading. None if there are fewer than `n`
    pub fn departure_heading_samples (&self, n: usize)->Option<Vec<&PositionUpdate>> {
        let samples: Vec<&PositionUpdate> = self.position_updates.iter()
            .filter( |p| is_heading_sample(p.heading))
            .take(n)
            .collect();

        if n > 0 && samples.len() == n { Some(samples) } else { None }
    }

    /// up to `n` latest positions with a heading, most recent first
    pub fn arrival_heading_samples (&self, n: usize)->Vec<&PositionUpdate> {
        self.position_updates.iter().rev()
            .filter( |p| is_heading_sample(p.heading))
            .take(n)
            .collect()
    }

    /// set the launch method if it was not determined yet. Answers if the value was set
    pub fn set_launch_method (&mut self, launch_method: LaunchMethod)->bool {
        if self.launch_method == LaunchMethod::Unknown && launch_method != LaunchMethod::Unknown {
            self.launch_method = launch_method;
            true
        } else {
            false
        }
    }

    /// set the end time if it was not set before and is not before the start time. Answers if the value was set
    pub fn set_end_time (&mut self, t: EpochMillis)->bool {
        if self.end_time.is_none() && self.start_time.is_none_or( |start| t >= start) {
            self.end_time = Some(t);
            true
        } else {
            false
        }
    }
}

/// mean heading of the samples in whole degrees (1..=360)
pub fn mean_heading (samples: &[&PositionUpdate])->u16 {
    let headings: Vec<f64> = samples.iter().map( |p| p.heading).collect();
    rounded_heading( mean( &headings))
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Flight( {}", self.aircraft)?;
        if let Some(t) = self.start_time { write!( f, ", start: {t}")?; }
        if let Some(t) = self.end_time { write!( f, ", end: {t}")?; }
        if let Some(hdg) = self.departure_heading { write!( f, ", dep_hdg: {hdg}")?; }
        if let Some(hdg) = self.arrival_heading { write!( f, ", arr_hdg: {hdg}")?; }
        if self.launch_method != LaunchMethod::Unknown { write!( f, ", launch: {}", self.launch_method)?; }
        write!( f, ", n_pos: {})", self.position_updates.len())
    }
}
