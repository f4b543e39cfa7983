// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod proxy;
pub mod rate_limit;
pub mod repo;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;
