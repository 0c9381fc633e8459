// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod bidirectional;
mod cancellable;
mod result;

pub use bidirectional::{find_path_bidirectional, find_path_bidirectional_with_visitor};
pub use cancellable::Cancellable;
pub use result::{PathResult, RoutingResult};
