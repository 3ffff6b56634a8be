//! Port abstraction layer.
//!
//! The session depends on the host only through the traits here, so real
//! hardware and mocks are interchangeable.

pub mod mock;
pub mod native;
pub mod traits;

pub use mock::{MockPort, MockSource};
pub use native::{NativePort, NativeSource};
pub use traits::{PortSource, SerialIo};
