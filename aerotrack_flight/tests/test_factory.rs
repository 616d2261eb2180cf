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

use std::{sync::{Arc, Mutex}, thread, time::Duration};
use chrono::TimeDelta;
use uom::si::{f64::Length, length::meter};
use aerotrack_common::{datetime::{millis, minutes, EpochMillis, ManualClock}, geo::GeoPoint};
use aerotrack_flight::{
    events::event_channel, lock_context, ContextState, FlightAnalysisError, FlightContext, FlightContextFactory,
    FlightContextFactoryConfig, FlightContextOptions, FlightEvent, FlightEventKind, RawPosition, Runway, SharedContext,
};

/// run with "cargo test --test test_factory -- --nocapture"

const T0: i64 = 1_718_000_000_000;

fn pos (i: i64, speed: f64)->RawPosition {
    RawPosition::new( EpochMillis::new( T0 + i*1000), 52.1 + i as f64 * 0.0001, 5.2, 10.0)
        .with_speed( speed)
        .with_heading( 90.0)
}

fn factory_with_clock ()->(FlightContextFactory, Arc<ManualClock>) {
    let clock = Arc::new( ManualClock::new( EpochMillis::new(T0)));
    let config = FlightContextFactoryConfig::new( Some( TimeDelta::hours(1)), false);
    let factory = FlightContextFactory::new( config).with_clock( clock.clone());
    (factory, clock)
}

fn drain (rx: &kanal::Receiver<FlightEvent>)->Vec<FlightEvent> {
    let mut events = Vec::new();
    while let Ok(Some(e)) = rx.try_recv() {
        events.push(e);
    }
    events
}

#[test]
fn test_config_coercion () {
    let config = FlightContextFactoryConfig::new( Some( TimeDelta::minutes(-5)), true);
    assert_eq!( config.context_expiration, Duration::from_secs(300));
    assert!( config.minify_memory_pressure);
    assert_eq!( config.min_required_position_updates, 5);

    let config = FlightContextFactoryConfig::new( None, false);
    assert_eq!( config.context_expiration, Duration::from_secs(3600));
}

#[test]
fn test_routing () {
    let (factory, _clock) = factory_with_clock();
    let events = factory.events();

    for (i,spd) in [0.0, 0.0, 40.0, 45.0, 50.0, 55.0, 60.0].iter().enumerate() {
        factory.submit( "PH-ABC", pos( i as i64, *spd)).unwrap();
        factory.submit( "PH-XYZ", pos( i as i64, 0.0)).unwrap();
    }

    assert_eq!( factory.len(), 2);
    assert!( factory.contains("PH-ABC"));
    assert!( factory.contains("PH-XYZ"));
    assert!( !factory.contains("D-1234"));

    let flight = factory.flight("PH-ABC").unwrap();
    assert_eq!( flight.start_time, Some( EpochMillis::new( T0 + 1000)));

    let events = drain( &events);
    assert_eq!( events.len(), 1);
    assert_eq!( events[0].kind, FlightEventKind::Takeoff);
    assert_eq!( events[0].aircraft.as_str(), "PH-ABC");
}

#[test]
fn test_eviction () {
    let (factory, clock) = factory_with_clock();
    let events = factory.events();

    for i in 0..3 {
        factory.submit( "PH-ABC", pos( i, 0.0)).unwrap();
    }
    assert_eq!( factory.flight("PH-ABC").unwrap().len(), 3);

    clock.advance( minutes(30));
    factory.submit( "PH-XYZ", pos( 0, 0.0)).unwrap();
    assert_eq!( factory.sweep(), 0);
    assert!( factory.contains("PH-ABC"));

    clock.advance( minutes(31));
    assert_eq!( factory.sweep(), 1);
    assert!( !factory.contains("PH-ABC"));
    assert!( factory.contains("PH-XYZ"));

    // eviction is silent
    assert!( drain( &events).is_empty());

    // a new context knows nothing about the evicted one
    factory.submit( "PH-ABC", pos( 10, 0.0)).unwrap();
    let flight = factory.flight("PH-ABC").unwrap();
    assert_eq!( flight.len(), 1);
    assert!( flight.start_time.is_none());

    clock.advance( minutes(61));
    assert_eq!( factory.sweep(), 2);
    assert!( factory.is_empty());
}

#[test]
fn test_touch_reschedules () {
    let (factory, clock) = factory_with_clock();

    factory.submit( "PH-ABC", pos( 0, 0.0)).unwrap();
    clock.advance( minutes(50));
    factory.submit( "PH-ABC", pos( 1, 0.0)).unwrap();
    clock.advance( minutes(50));

    // the expiry entry is stale and gets re-scheduled
    assert_eq!( factory.sweep(), 0);
    assert!( factory.contains("PH-ABC"));

    clock.advance( minutes(11));
    assert_eq!( factory.sweep(), 1);
}

#[test]
fn test_concurrent_submissions () {
    let factory = FlightContextFactory::new( FlightContextFactoryConfig::default());
    let n_aircraft = 8;
    let n_threads = 4;
    let n_positions = 100;

    thread::scope( |s| {
        for t in 0..n_threads {
            let factory = &factory;
            s.spawn( move || {
                for i in (t..n_positions).step_by( n_threads) {
                    for a in 0..n_aircraft {
                        factory.submit( &format!("AC-{a}"), pos( i as i64, 5.0)).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!( factory.len(), n_aircraft);
    for a in 0..n_aircraft {
        let flight = factory.flight( &format!("AC-{a}")).unwrap();
        let ps = &flight.position_updates;
        assert_eq!( ps.len(), n_positions);
        assert!( ps.iter().zip( ps.iter().skip(1)).all( |(a,b)| a.timestamp <= b.timestamp));
    }
}

#[test]
fn test_close () {
    let (factory, _clock) = factory_with_clock();
    let events = factory.events();

    factory.submit( "PH-ABC", pos( 0, 50.0)).unwrap();
    let kinds: Vec<FlightEventKind> = drain( &events).iter().map( |e| e.kind).collect();
    assert_eq!( kinds, vec![FlightEventKind::Takeoff, FlightEventKind::RadarContact]);

    factory.close();
    assert!( factory.is_closed());
    assert!( factory.is_empty());

    match factory.submit( "PH-ABC", pos( 1, 50.0)) {
        Err( FlightAnalysisError::FactoryClosed) => {}
        other => panic!("expected FactoryClosed, got {other:?}")
    }

    factory.close(); // closing twice is a no-op
}

#[test]
fn test_fault_isolation () {
    let (factory, _clock) = factory_with_clock();
    let faults = factory.faults();

    factory.submit( "PH-ABC", pos( 0, 0.0)).unwrap();
    factory.submit( "PH-XYZ", pos( 0, 0.0)).unwrap();

    let res: Option<()> = factory.with_context( "PH-ABC", |_ctx| panic!("boom"));
    assert!( res.is_none());

    let fault = faults.try_recv().unwrap().unwrap();
    println!("{fault}");
    assert_eq!( fault.aircraft.as_str(), "PH-ABC");
    assert_eq!( fault.reason, "boom");

    // the faulted context was reset, the other one is unaffected
    assert!( factory.flight("PH-ABC").unwrap().is_empty());
    assert_eq!( factory.flight("PH-XYZ").unwrap().len(), 1);

    factory.submit( "PH-ABC", pos( 1, 0.0)).unwrap();
    assert_eq!( factory.flight("PH-ABC").unwrap().len(), 1);
    assert_eq!( factory.flush(), 0);
}

#[test]
fn test_faulted_context_is_evicted () {
    let (factory, clock) = factory_with_clock();
    let faults = factory.faults();

    factory.submit( "PH-ABC", pos( 0, 0.0)).unwrap();
    let res: Option<()> = factory.with_context( "PH-ABC", |_ctx| panic!("boom"));
    assert!( res.is_none());
    assert!( faults.try_recv().unwrap().is_some());
    assert_eq!( factory.with_context( "PH-ABC", |ctx| ctx.state()), Some( ContextState::Idle));

    clock.advance( minutes(30));
    assert_eq!( factory.sweep(), 0);

    clock.advance( minutes(31));
    assert_eq!( factory.sweep(), 1);
    assert!( !factory.contains("PH-ABC"));
}

#[test]
fn test_sweep_skips_locked_context () {
    let (factory, clock) = factory_with_clock();

    factory.submit( "PH-ABC", pos( 0, 0.0)).unwrap();
    clock.advance( minutes(61));

    let ctx = factory.get_context( "PH-ABC").unwrap();
    {
        let guard = lock_context( &ctx);
        assert_eq!( factory.sweep(), 0); // expired but locked
        assert!( factory.contains("PH-ABC"));
        assert!( !guard.is_evicted());
    }

    // the context was re-scheduled at the time of the last sweep
    assert_eq!( factory.sweep(), 0);
    clock.advance( minutes(61));
    assert_eq!( factory.sweep(), 1);
    assert!( !factory.contains("PH-ABC"));
    assert!( lock_context( &ctx).is_evicted());

    // a new submission gets a new context
    factory.submit( "PH-ABC", pos( 1, 0.0)).unwrap();
    let new_ctx = factory.get_context( "PH-ABC").unwrap();
    assert!( !Arc::ptr_eq( &ctx, &new_ctx));
    assert_eq!( factory.flight("PH-ABC").unwrap().len(), 1);
}

#[test]
fn test_submit_races_sweep () {
    let clock = Arc::new( ManualClock::new( EpochMillis::new(T0)));
    let config = FlightContextFactoryConfig::new( Some( TimeDelta::zero()), false);
    let factory = FlightContextFactory::new( config).with_clock( clock.clone());
    let n = 1000;

    thread::scope( |s| {
        let f = &factory;
        s.spawn( move || {
            for i in 0..n {
                f.submit( "PH-ABC", pos( i, 0.0)).unwrap();
            }
        });

        let f = &factory;
        let clock = &clock;
        s.spawn( move || {
            for _ in 0..n {
                clock.advance( millis(1));
                f.sweep();
            }
        });
    });

    // whatever got evicted in between, submissions never end up in an evicted context
    factory.submit( "PH-ABC", pos( n, 0.0)).unwrap();
    assert_eq!( factory.len(), 1);
    assert_eq!( factory.with_context( "PH-ABC", |ctx| ctx.is_evicted()), Some(false));
    let flight = factory.flight("PH-ABC").unwrap();
    assert_eq!( flight.last_position().map( |p| p.timestamp), Some( EpochMillis::new( T0 + n*1000)));
}

#[test]
fn test_lookups () {
    let (sink, _rx) = event_channel();
    let other: SharedContext = Arc::new( Mutex::new( FlightContext::new( FlightContextOptions::new("D-1234"), sink)));
    let other_ref = other.clone();

    let factory = FlightContextFactory::new( FlightContextFactoryConfig::default())
        .with_runway_lookup( |location: &GeoPoint, radius: Length| {
            vec![ Runway {
                designator: "09".to_string(),
                start: GeoPoint::from_lon_lat_degrees( 5.19, 52.1),
                end: GeoPoint::from_lon_lat_degrees( 5.21, 52.1),
            }]
        })
        .with_aircraft_lookup( move |location: &GeoPoint, radius: Length| vec![ other_ref.clone() ]);

    // no position yet, nothing to look up from
    factory.submit( "PH-ABC", RawPosition::new( EpochMillis::new(T0), 52.1, 5.2, 10.0)).unwrap();
    let radius = Length::new::<meter>( 5000.0);
    assert_eq!( factory.with_context( "PH-ABC", |ctx| ctx.nearby_runways( radius).len()), Some(0));

    factory.submit( "PH-ABC", pos( 1, 0.0)).unwrap();
    let runways = factory.with_context( "PH-ABC", |ctx| ctx.nearby_runways( radius)).unwrap();
    assert_eq!( runways.len(), 1);
    assert_eq!( runways[0].designator, "09");
    assert_eq!( runways[0].heading(), 90);

    let aircraft = factory.with_context( "PH-ABC", |ctx| ctx.nearby_aircraft( radius)).unwrap();
    assert_eq!( aircraft.len(), 1);
    assert_eq!( lock_context( &aircraft[0]).aircraft().as_str(), "D-1234");
}

#[tokio::test]
async fn test_sweeper () {
    let config = FlightContextFactoryConfig::new( Some( TimeDelta::zero()), false)
        .with_sweep_interval( Duration::from_millis(20));
    let factory = Arc::new( FlightContextFactory::new( config));
    let sweeper = factory.spawn_sweeper();

    factory.submit( "PH-ABC", pos( 0, 0.0)).unwrap();
    assert!( factory.contains("PH-ABC"));

    tokio::time::sleep( Duration::from_millis(200)).await;
    assert!( !factory.contains("PH-ABC"));

    factory.close();
    sweeper.await.unwrap();
}
