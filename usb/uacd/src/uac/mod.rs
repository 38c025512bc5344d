//! USB Audio Class constants.
//!
//! - UAC1 - USB Device Class Definition for Audio Devices, Release 1.0
//! - UAC2 - USB Device Class Definition for Audio Devices, Release 2.0
//! - MIDI - USB Device Class Definition for MIDI Devices, Release 1.0
//!
//! Descriptor subtypes and control selectors were renumbered between releases, so each release
//! gets its own module. Values shared by both live here.

pub mod v1;
pub mod v2;

/// bInterfaceClass of every audio interface.
pub const CLASS_AUDIO: u8 = 0x01;

/// Audio interface subclasses (bInterfaceSubClass).
pub const SUBCLASS_AUDIO_CONTROL: u8 = 0x01;
pub const SUBCLASS_AUDIO_STREAMING: u8 = 0x02;
pub const SUBCLASS_MIDI_STREAMING: u8 = 0x03;

/// bInterfaceProtocol of Audio 2.0 interfaces, and bFunctionProtocol of their IAD.
pub const IP_VERSION_02_00: u8 = 0x20;

/// Class-specific AS interface subtypes, identical in both releases.
pub const AS_GENERAL: u8 = 0x01;
pub const FORMAT_TYPE: u8 = 0x02;
pub const FORMAT_SPECIFIC: u8 = 0x03;

/// Class-specific endpoint subtype, identical in both releases.
pub const EP_GENERAL: u8 = 0x01;

/// Format type codes (bFormatType).
pub const FORMAT_TYPE_I: u8 = 0x01;
pub const FORMAT_TYPE_II: u8 = 0x02;
pub const FORMAT_TYPE_III: u8 = 0x03;

/// MIDI Streaming interface subtypes. The MIDI class has a single release, so these records are
/// carried unchanged through the translation.
pub mod midi {
    pub const MS_HEADER: u8 = 0x01;
    pub const MIDI_IN_JACK: u8 = 0x02;
    pub const MIDI_OUT_JACK: u8 = 0x03;
    pub const ELEMENT: u8 = 0x04;

    /// Class-specific MIDI endpoint subtype.
    pub const MS_GENERAL: u8 = 0x01;
}
