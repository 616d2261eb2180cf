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

use std::{path::PathBuf, sync::Arc};
use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use aerotrack_common::datetime::{Clock, EpochMillis, ManualClock};
use aerotrack_flight::{load_config, FlightContextFactory, FlightContextFactoryConfig, FlightEvent, RawPosition};

/// replay a recorded CSV track file through a flight context factory and print the resulting flight events as
/// JSON lines. Set RUST_LOG to see what is going on inside the contexts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON file with a FlightContextFactoryConfig
    #[arg(short,long)]
    config: Option<PathBuf>,

    /// only keep a trailing window of positions per flight
    #[arg(short,long)]
    minify: bool,

    /// pretty print events
    #[arg(short,long)]
    pretty: bool,

    /// CSV file with aircraft,timestamp,latitude,longitude,altitude,speed,heading records
    track_file: PathBuf,
}

#[derive(Deserialize,Debug)]
struct TrackRecord {
    aircraft: String,
    timestamp: i64, // epoch millis
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed: Option<f64>,
    heading: Option<f64>,
}

impl TrackRecord {
    fn raw_position (&self)->RawPosition {
        RawPosition {
            timestamp: EpochMillis::new( self.timestamp),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            speed: self.speed,
            heading: self.heading,
        }
    }
}

fn print_event (event: &FlightEvent, pretty: bool)->Result<()> {
    let json = if pretty { serde_json::to_string_pretty( event)? } else { serde_json::to_string( event)? };
    println!("{json}");
    Ok(())
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())
        .with_writer( std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config: FlightContextFactoryConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => FlightContextFactoryConfig::default()
    };
    if args.minify { config.minify_memory_pressure = true }
    config.check()?;

    let sweep_interval = config.sweep_interval.as_millis() as i64;
    let clock = Arc::new( ManualClock::new( EpochMillis::new(0)));
    let factory = FlightContextFactory::new( config).with_clock( clock.clone());
    let events = factory.events();

    let mut reader = csv::Reader::from_path( &args.track_file)?;
    let mut last_sweep: Option<EpochMillis> = None;
    let mut n_records = 0;

    for rec in reader.deserialize() {
        let rec: TrackRecord = rec?;
        n_records += 1;

        // the clock follows the data, we never go back in time
        clock.set_later( EpochMillis::new( rec.timestamp));
        factory.submit( &rec.aircraft, rec.raw_position())?;

        let now = clock.now();
        match last_sweep {
            Some(t) if now.millis_since(t) < sweep_interval => {}
            _ => {
                factory.sweep();
                last_sweep = Some(now);
            }
        }

        while let Ok(Some(event)) = events.try_recv() {
            print_event( &event, args.pretty)?;
        }
    }

    factory.close();
    while let Ok(Some(event)) = events.try_recv() {
        print_event( &event, args.pretty)?;
    }

    info!("replayed {} records from {:?}", n_records, args.track_file);
    Ok(())
}
