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
use std::{fmt, ops, sync::atomic::{AtomicI64, Ordering}, time::Duration};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use parse_duration::parse;

/// a timestamp as milliseconds since the unix epoch.
/// This is what we store in position updates - msec is enough precision and it keeps the type `Copy` and `Ord`
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Default)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub const fn new (millis: i64)->Self { EpochMillis(millis) }

    pub const fn from_secs (secs: i64)->Self { EpochMillis(secs*1000) }

    #[inline] pub fn millis (&self)->i64 { self.0 }

    /// signed milliseconds from `earlier` to self
    #[inline] pub fn millis_since (&self, earlier: EpochMillis)->i64 { self.0 - earlier.0 }

    /// signed (fractional) seconds from `earlier` to self
    #[inline] pub fn secs_since (&self, earlier: EpochMillis)->f64 { (self.0 - earlier.0) as f64 / 1000.0 }

    pub fn to_utc (&self)->Option<DateTime<Utc>> { DateTime::<Utc>::from_timestamp_millis(self.0) }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_utc() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0)
        }
    }
}

impl<Tz> From<DateTime<Tz>> for EpochMillis where Tz: TimeZone {
    fn from (date: DateTime<Tz>)->Self { EpochMillis( date.timestamp_millis()) }
}

impl ops::Add<Duration> for EpochMillis {
    type Output = EpochMillis;
    fn add (self, rhs: Duration)->Self::Output { EpochMillis( self.0 + rhs.as_millis() as i64) }
}

impl ops::Sub<Duration> for EpochMillis {
    type Output = EpochMillis;
    fn sub (self, rhs: Duration)->Self::Output { EpochMillis( self.0 - rhs.as_millis() as i64) }
}

// simple Duration ctors that avoid the still experimental std versions for minutes and hours
#[inline] pub const fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub const fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub const fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub const fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }

/* #region clocks ***********************************************************************************************/

/// where we get the current time from. Use [`ManualClock`] if time should follow data or tests
pub trait Clock: Send + Sync {
    fn now (&self)->EpochMillis;
}

/// the wall clock
#[derive(Debug,Default,Clone,Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now (&self)->EpochMillis { EpochMillis::now() }
}

/// a clock that only changes if explicitly set or advanced. Thread safe
#[derive(Debug,Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new (start: EpochMillis)->Self { ManualClock( AtomicI64::new( start.millis())) }

    pub fn set (&self, t: EpochMillis) { self.0.store( t.millis(), Ordering::Relaxed) }

    /// set to given time only if that is later than the current value
    pub fn set_later (&self, t: EpochMillis) { self.0.fetch_max( t.millis(), Ordering::Relaxed); }

    pub fn advance (&self, d: Duration) { self.0.fetch_add( d.as_millis() as i64, Ordering::Relaxed); }
}

impl Clock for ManualClock {
    fn now (&self)->EpochMillis { EpochMillis( self.0.load(Ordering::Relaxed)) }
}

/* #endregion clocks */

//--- serde support for human readable durations such as "1h" or "90s"

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |s| {
        parse( s.as_str()).map_err( |e| serde::de::Error::custom( format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_str( &format!("{}s", dur.as_secs_f64()))
}
