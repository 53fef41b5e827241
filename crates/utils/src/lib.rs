// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small collection of ambient utilities shared across the `codeshift` crates.

mod fastmap;
pub use fastmap::{
    RapidInlineHasher, RapidMap, RapidSet, get_map, get_set, hash_bytes, hash_bytes_with_seed,
    hash_file, hash_file_with_seed, map_with_capacity, set_with_capacity,
};
