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
use std::collections::VecDeque;

/// push a new element to the end of a VecDeque used as a ringbuffer with given max length
#[inline]
pub fn push_to_ringbuffer<T> (v: &mut VecDeque<T>, max_len: usize, t: T) {
    while v.len() >= max_len && !v.is_empty() {
        v.pop_front();
    }
    if max_len > 0 {
        v.push_back(t)
    }
}

/// drop front elements until at most `max_len` remain. Returns the number of removed elements
pub fn truncate_front<T> (v: &mut VecDeque<T>, max_len: usize)->usize {
    let n = v.len().saturating_sub( max_len);
    v.drain(..n);
    n
}

/// insert `t` into an ascending ordered VecDeque after all elements with a key that is not greater.
/// Appending is the common case, i.e. we check the back before we binary search.
/// Returns the index of the inserted element
pub fn insert_sorted_by_key<T,K,F> (v: &mut VecDeque<T>, t: T, key: F)->usize where K: Ord, F: Fn(&T)->K {
    let k = key(&t);
    let idx = match v.back() {
        Some(last) if key(last) > k => v.partition_point( |e| key(e) <= k),
        _ => v.len()
    };
    v.insert( idx, t);
    idx
}

/// remove all leading elements for which the predicate holds. Returns the number of removed elements
pub fn drain_front_while<T,F> (v: &mut VecDeque<T>, pred: F)->usize where F: Fn(&T)->bool {
    let n = v.iter().take_while( |e| pred(e)).count();
    v.drain(..n);
    n
}
