//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the pipeline end to end
//! against mock adapters. No sensor, DMX node or drop directory consumer
//! is required.

mod mock_io;
mod runner_tests;
mod scenario_tests;
