//! Common test utilities and mock implementations

pub mod mock_chip;

pub use mock_chip::{MockPin, MockSpi};
pub use test_utils::{create_mock_driver, create_mock_driver_with_config, Radio};
