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
use std::{cmp::{Ordering, Reverse}, collections::{BinaryHeap, VecDeque}};
use aerotrack_common::{collections::push_to_ringbuffer, datetime::EpochMillis, geo::GeoPoint};
use crate::position::{RawPosition, PositionUpdate};

/// how many of the most recently admitted locations we check for duplicates
pub const RECENT_ADMISSIONS: usize = 10;

/// heap entry that orders by timestamp, and by enqueue order for equal timestamps
#[derive(Debug)]
struct QueuedPosition {
    seq: u64,
    raw: RawPosition,
}

impl QueuedPosition {
    fn key (&self)->(EpochMillis,u64) { (self.raw.timestamp, self.seq) }
}

impl PartialEq for QueuedPosition {
    fn eq (&self, other: &Self)->bool { self.key() == other.key() }
}
impl Eq for QueuedPosition {}

impl PartialOrd for QueuedPosition {
    fn partial_cmp (&self, other: &Self)->Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for QueuedPosition {
    fn cmp (&self, other: &Self)->Ordering { self.key().cmp( &other.key()) }
}

/// the per-context admission buffer. Raw positions come out in ascending timestamp order regardless of
/// the order in which they were submitted. The queue also remembers the locations of the last admitted
/// positions so that the consumer can drop re-transmissions
#[derive(Debug,Default)]
pub struct IngestionQueue {
    heap: BinaryHeap<Reverse<QueuedPosition>>,
    next_seq: u64,
    recent: VecDeque<GeoPoint>, // in admission order
}

impl IngestionQueue {
    pub fn new ()->Self {
        IngestionQueue {
            heap: BinaryHeap::new(),
            next_seq: 0,
            recent: VecDeque::with_capacity( RECENT_ADMISSIONS),
        }
    }

    pub fn enqueue (&mut self, raw: RawPosition) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push( Reverse( QueuedPosition{ seq, raw }));
    }

    pub fn dequeue (&mut self)->Option<RawPosition> {
        self.heap.pop().map( |Reverse(qp)| qp.raw)
    }

    pub fn peek_timestamp (&self)->Option<EpochMillis> {
        self.heap.peek().map( |Reverse(qp)| qp.raw.timestamp)
    }

    pub fn len (&self)->usize { self.heap.len() }
    pub fn is_empty (&self)->bool { self.heap.is_empty() }

    /// answer if the (normalized) location of the raw position is exactly the same as the one of a recently
    /// admitted position
    pub fn is_recent_duplicate (&self, raw: &RawPosition)->bool {
        let location = raw.location();
        self.recent.iter().any( |p| p.is_same_location( &location))
    }

    pub fn record_admitted (&mut self, p: &PositionUpdate) {
        push_to_ringbuffer( &mut self.recent, RECENT_ADMISSIONS, p.location);
    }

    /// forget admission history (the flight it belonged to is gone). Pending positions are kept
    pub fn reset_admissions (&mut self) {
        self.recent.clear();
    }
}
