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

use std::collections::VecDeque;
use aerotrack_common::collections::{drain_front_while, insert_sorted_by_key, push_to_ringbuffer, truncate_front};

/// run with "cargo test --test test_collections -- --nocapture"

#[test]
fn test_ringbuffer () {
    let mut v: VecDeque<u32> = VecDeque::new();
    for i in 0..15 {
        push_to_ringbuffer( &mut v, 10, i);
    }
    println!("{v:?}");
    assert_eq!( v.len(), 10);
    assert_eq!( v.front(), Some(&5));
    assert_eq!( v.back(), Some(&14));
}

#[test]
fn test_insert_sorted () {
    let mut v: VecDeque<(i64,&str)> = VecDeque::new();

    assert_eq!( insert_sorted_by_key( &mut v, (10,"a"), |e| e.0), 0);
    assert_eq!( insert_sorted_by_key( &mut v, (30,"b"), |e| e.0), 1);
    assert_eq!( insert_sorted_by_key( &mut v, (20,"c"), |e| e.0), 1);
    assert_eq!( insert_sorted_by_key( &mut v, (5,"d"), |e| e.0), 0);
    assert_eq!( insert_sorted_by_key( &mut v, (20,"e"), |e| e.0), 3); // after existing equal keys

    println!("{v:?}");
    let keys: Vec<&str> = v.iter().map( |e| e.1).collect();
    assert_eq!( keys, vec!["d", "a", "c", "e", "b"]);
}

#[test]
fn test_front_removal () {
    let mut v: VecDeque<u32> = (0..10).collect();

    assert_eq!( drain_front_while( &mut v, |e| *e < 3), 3);
    assert_eq!( v.front(), Some(&3));

    assert_eq!( truncate_front( &mut v, 4), 3);
    assert_eq!( v, VecDeque::from( vec![6,7,8,9]));

    assert_eq!( truncate_front( &mut v, 10), 0);
    assert_eq!( drain_front_while( &mut v, |e| *e > 100), 0);
}
