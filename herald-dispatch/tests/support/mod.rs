//! Test support utilities for dispatch integration tests.

pub mod mock_server;

pub use mock_server::{MockRelay, RelayCommand};
