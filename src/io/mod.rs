// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for clips, session status and annotation files.

pub mod discovery;
pub mod media;
pub mod serialization;
