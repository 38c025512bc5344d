//! USB Audio Class 1.0 to 2.0 translation.
//!
//! A device speaking USB Audio 1.0 is enumerated once, its descriptors are parsed into an entity
//! graph, the clock domains Audio 1.0 leaves implicit are made explicit, and the whole device is
//! re-emitted as an Audio 2.0 function. Audio 2.0 class requests the host sends afterwards are
//! translated back into Audio 1.0 requests, or answered from the model for the entities that
//! only exist on the Audio 2.0 side.
//!
//! The pieces, bottom up:
//!
//! - [reader] walks class-specific descriptors into an [entity::EntityList]
//! - [topology] links terminals to clock sources and fills in their rates
//! - [model] indexes configurations, interfaces and alternate settings
//! - [writer] synthesizes the Audio 2.0 descriptors
//! - [dispatch] translates control requests
//! - [device::AudioDevice] ties them together behind one lock per device

pub mod config;
pub mod device;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod model;
pub mod reader;
pub mod requests;
pub mod topology;
pub mod transport;
pub mod uac;
pub mod usb;
pub mod writer;

pub use crate::device::AudioDevice;
pub use crate::dispatch::{ControlRequest, ControlResponse, Direction, RequestKind};
pub use crate::error::{AttachError, DispatchError, ParseError, TransportError, WriteError};
pub use crate::transport::{DeviceTransport, ReplayTransport};
pub use crate::writer::Uac2Descriptor;
