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
use serde::{Serialize, Deserialize};
use strum::{Display, EnumString};
use crate::{position::PositionUpdate, zscore};

pub const LAUNCH_LAG: usize = 20;
pub const LAUNCH_THRESHOLD: f64 = 2.0;
pub const LAUNCH_INFLUENCE: f64 = 1.0;

/// we need at least one full window plus the sample we evaluate
pub const MIN_CLIMB_RATE_SAMPLES: usize = LAUNCH_LAG + 1;

/// position pairs closer in time than this are skipped when computing climb rates
pub const MIN_CLIMB_RATE_INTERVAL_SECS: f64 = 0.1;

#[derive(Serialize,Deserialize,Display,EnumString,Debug,Clone,Copy,PartialEq,Eq,Hash,Default)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LaunchMethod {
    #[default]
    Unknown,
    Winch,
    Aerotow,
    SelfLaunch,
}

/// altitude change per minute between consecutive positions
pub fn climb_rates<'a,I> (positions: I)->Vec<f64> where I: IntoIterator<Item=&'a PositionUpdate> {
    let mut rates = Vec::new();
    let mut prev: Option<&PositionUpdate> = None;

    for p in positions {
        if let Some(last) = prev {
            let dt = p.timestamp.secs_since( last.timestamp);
            if dt >= MIN_CLIMB_RATE_INTERVAL_SECS {
                rates.push( (p.altitude - last.altitude) / (dt / 60.0));
            }
        }
        prev = Some(p);
    }
    rates
}

/// classify a climb rate series. A winch launch ends with an abrupt, sustained drop of the climb rate when
/// the cable is released, which shows up as a trough signal. Returns None if there are not enough samples yet.
/// Aerotow and self launch are never positively identified - no trough leaves the method `Unknown`
pub fn classify_climb_rates (rates: &[f64])->Option<LaunchMethod> {
    if rates.len() < MIN_CLIMB_RATE_SAMPLES {
        return None
    }

    let output = zscore::detect( rates, LAUNCH_LAG, LAUNCH_THRESHOLD, LAUNCH_INFLUENCE);
    if output.has_trough() { Some(LaunchMethod::Winch) } else { Some(LaunchMethod::Unknown) }
}

pub fn classify_launch<'a,I> (positions: I)->Option<LaunchMethod> where I: IntoIterator<Item=&'a PositionUpdate> {
    classify_climb_rates( &climb_rates( positions))
}
