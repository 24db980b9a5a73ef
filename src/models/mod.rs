// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Plain data shared by the annotator components.

pub mod grid;
pub mod label;
pub mod page;
pub mod status;
