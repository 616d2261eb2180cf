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
//! shared types and functions for aerotrack crates: time, geodetic points, angles and bounded collections

pub mod datetime;
pub mod angle;
pub mod geo;
pub mod collections;

// a global fn that can be used with serde(skip_serializing_if="aerotrack_common::is_none")
#[inline] pub fn is_none<T> (opt: &Option<T>)->bool { opt.is_none() }

#[inline(always)] pub fn pow2(x:f64) -> f64 { x*x }

/// arithmetic mean of given values, NaN if there are none
pub fn mean (values: &[f64])->f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// population standard deviation around a given mean
pub fn std_dev (values: &[f64], mean: f64)->f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        let var = values.iter().fold( 0.0, |acc, x| acc + pow2(x - mean)) / values.len() as f64;
        var.sqrt()
    }
}
