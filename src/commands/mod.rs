// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod loans;
pub mod history;
pub mod outstanding;
pub mod stats;
pub mod report;
pub mod exporter;
pub mod doctor;
