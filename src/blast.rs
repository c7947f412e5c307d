// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

pub mod client;
pub mod filter;
pub mod record;
pub mod report;
