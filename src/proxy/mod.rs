// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Outbound calls to the generative model and the quote provider.

pub mod ai;
pub mod quote;
