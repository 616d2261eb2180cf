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
#![allow(unused)]

use aerotrack_common::{datetime::EpochMillis, geo::GeoPoint};
use aerotrack_flight::{launch::{classify_climb_rates, classify_launch, climb_rates}, LaunchMethod, PositionUpdate};

/// run with "cargo test --test test_launch -- --nocapture"

fn position (t_millis: i64, altitude: f64)->PositionUpdate {
    PositionUpdate {
        timestamp: EpochMillis::new( 1_718_000_000_000 + t_millis),
        location: GeoPoint::from_lon_lat_degrees( 5.2, 52.1),
        altitude,
        speed: 50.0,
        heading: 90.0,
    }
}

#[test]
fn test_climb_rates () {
    let positions = vec![
        position( 0, 0.0),
        position( 1000, 10.0),   // 600 m/min
        position( 1050, 10.0),   // too close, skipped
        position( 3050, 0.0),    // -300 m/min
    ];

    let rates = climb_rates( positions.iter());
    println!("rates: {rates:?}");
    assert_eq!( rates.len(), 2);
    assert!( (rates[0] - 600.0).abs() < 1e-9);
    assert!( (rates[1] + 300.0).abs() < 1e-9);
}

#[test]
fn test_winch_classification () {
    let mut rates = vec![600.0; 20];
    rates.extend_from_slice( &[-50.0; 5]);
    assert_eq!( classify_climb_rates( &rates), Some(LaunchMethod::Winch));

    let rates = vec![600.0; 25];
    assert_eq!( classify_climb_rates( &rates), Some(LaunchMethod::Unknown));

    let rates = vec![600.0; 20]; // not enough samples
    assert_eq!( classify_climb_rates( &rates), None);
}

#[test]
fn test_classify_positions () {
    // steady climb followed by a level-off after cable release
    let mut positions: Vec<PositionUpdate> = (0..22).map( |i| position( i*1000, i as f64 * 10.0)).collect();
    positions.push( position( 22_000, 210.0));

    let method = classify_launch( positions.iter());
    println!("launch method: {method:?}");
    assert_eq!( method, Some(LaunchMethod::Winch));

    let steady: Vec<PositionUpdate> = (0..30).map( |i| position( i*1000, i as f64 * 10.0)).collect();
    assert_eq!( classify_launch( steady.iter()), Some(LaunchMethod::Unknown));
}

#[test]
fn test_launch_method_names () {
    assert_eq!( LaunchMethod::SelfLaunch.to_string(), "self-launch");
    assert_eq!( "winch".parse::<LaunchMethod>().unwrap(), LaunchMethod::Winch);
    assert_eq!( LaunchMethod::default(), LaunchMethod::Unknown);
}
