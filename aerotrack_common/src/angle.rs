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
//! angle normalization and heading helpers. All angles are in degrees

#[inline]
pub fn normalize_90 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

/// normalize into [0,360)
#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

/// round a heading to whole degrees in 1..=360. North is reported as 360 so that 0 can mean "no heading".
/// Ties round to the even neighbour
pub fn rounded_heading (deg: f64) -> u16 {
    let h = (deg.round_ties_even() as i64).rem_euclid(360);
    if h == 0 { 360 } else { h as u16 }
}

/// answer if the value is a usable heading sample (stationary targets report 0)
#[inline]
pub fn is_heading_sample (deg: f64) -> bool {
    deg != 0.0 && !deg.is_nan()
}
