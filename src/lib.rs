// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod chain;         // items, steps, chain building
pub mod config;        // config loading + runtime assembly
pub mod demo;          // demo build steps
pub mod engine;        // wave executor and results
pub mod errors;        // error handling
pub mod observability;
pub mod traits;        // executor and step action abstractions
