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
//! smoothed z-score peak and trough detection over a numeric series.
//!
//! A sample is a signal if it deviates from the mean of the trailing `lag` window by more than
//! `threshold` standard deviations. Signalling samples only enter the window dampened by `influence`
//! so that a sustained peak does not immediately become the new normal.

use aerotrack_common::{mean, std_dev};

/// the result of a detection run. All vectors have the length of the input series
#[derive(Debug,Clone,PartialEq)]
pub struct ZScoreOutput {
    pub signals: Vec<i8>,       // -1: trough, 0: none, 1: peak
    pub avg_filter: Vec<f64>,   // rolling window mean after each sample
    pub std_filter: Vec<f64>,   // rolling window (population) std after each sample
}

impl ZScoreOutput {
    pub fn has_trough (&self)->bool { self.signals.iter().any( |s| *s == -1) }
    pub fn has_peak (&self)->bool { self.signals.iter().any( |s| *s == 1) }
}

/// tolerance so that rounding noise of a constant window (std == 0) does not count as deviation
#[inline]
fn tolerance (mean: f64)->f64 { 16.0 * f64::EPSILON * mean.abs().max(1.0) }

pub fn detect (series: &[f64], lag: usize, threshold: f64, influence: f64)->ZScoreOutput {
    let n = series.len();
    let mut signals = vec![0i8; n];
    let mut avg_filter = vec![0.0; n];
    let mut std_filter = vec![0.0; n];

    if lag == 0 || n < lag {
        return ZScoreOutput { signals, avg_filter, std_filter }
    }

    let influence = influence.clamp( 0.0, 1.0);
    let mut filtered: Vec<f64> = series.to_vec();

    avg_filter[lag-1] = mean( &filtered[..lag]);
    std_filter[lag-1] = std_dev( &filtered[..lag], avg_filter[lag-1]);

    for i in lag..n {
        let avg = avg_filter[i-1];
        let dev = series[i] - avg;

        if dev.abs() > threshold * std_filter[i-1] + tolerance(avg) {
            signals[i] = if dev > 0.0 { 1 } else { -1 };
            filtered[i] = influence * series[i] + (1.0 - influence) * series[i-1];
        } else {
            filtered[i] = series[i];
        }

        let window = &filtered[i+1-lag ..= i];
        avg_filter[i] = mean( window);
        std_filter[i] = std_dev( window, avg_filter[i]);
    }

    ZScoreOutput { signals, avg_filter, std_filter }
}
