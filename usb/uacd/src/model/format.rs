//! Audio Streaming format records: `AS_GENERAL` and the format-type descriptors (UAC1 Frmts 2).

use serde::Serialize;
use smallvec::SmallVec;

use crate::entity::FrequencyRange;
use crate::error::ParseError;
use crate::reader::Descriptor;
use crate::uac::{self, v2};

/// The Audio 1.0 class-specific `AS_GENERAL` interface descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct AsGeneral {
    /// Id of the terminal the stream is connected to.
    pub terminal_link: u8,
    /// bDelay, in frames.
    pub delay: u8,
    /// wFormatTag
    pub format_tag: u16,
}

impl AsGeneral {
    pub fn parse(desc: &Descriptor) -> Result<Self, ParseError> {
        let mut cursor = desc.cursor(3);
        Ok(Self {
            terminal_link: cursor.u8()?,
            delay: cursor.u8()?,
            format_tag: cursor.u16()?,
        })
    }

    /// The Audio 2.0 bmFormats bit standing for this format tag.
    ///
    /// Audio 1.0 numbers the formats of each type from 1 within a 0x1000 block; Audio 2.0 turns
    /// the same numbering into bit positions. Tags outside the numbered range become raw data.
    pub fn formats_bitmap(&self) -> u32 {
        match self.format_tag & 0x0FFF {
            index @ 1..=31 => 1 << (index - 1),
            _ => v2::FORMAT_TYPE_I_RAW_DATA,
        }
    }
}

/// The sampling frequencies a format descriptor allows.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SampleRates {
    /// bSamFreqType 0: any rate between the two bounds.
    Continuous { min: u32, max: u32 },
    /// bSamFreqType n: exactly the n listed rates.
    Discrete(SmallVec<[u32; 4]>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum FormatDetails {
    /// Type I (PCM like) and Type III (IEC 61937 over PCM slots) share their layout.
    Pcm {
        channels: u8,
        subframe_size: u8,
        bit_resolution: u8,
    },
    /// Type II (compressed, MPEG and AC-3).
    Compressed {
        max_bit_rate: u16,
        samples_per_frame: u16,
    },
}

/// A Type I, II or III format-type descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FormatTypeDescriptor {
    pub length: u8,
    pub descriptor_type: u8,
    pub descriptor_subtype: u8,
    pub format_type: u8,
    pub details: FormatDetails,
    pub rates: SampleRates,
}

impl FormatTypeDescriptor {
    pub fn parse(desc: &Descriptor) -> Result<Self, ParseError> {
        let mut cursor = desc.cursor(3);
        let format_type = cursor.u8()?;
        let details = match format_type {
            uac::FORMAT_TYPE_I | uac::FORMAT_TYPE_III => FormatDetails::Pcm {
                channels: cursor.u8()?,
                subframe_size: cursor.u8()?,
                bit_resolution: cursor.u8()?,
            },
            uac::FORMAT_TYPE_II => FormatDetails::Compressed {
                max_bit_rate: cursor.u16()?,
                samples_per_frame: cursor.u16()?,
            },
            _ => {
                return Err(ParseError::UnknownRequiredField {
                    offset: desc.offset,
                    field: "bFormatType",
                })
            }
        };
        let rates = match cursor.u8()? {
            0 => SampleRates::Continuous {
                min: cursor.u24()?,
                max: cursor.u24()?,
            },
            count => SampleRates::Discrete(
                (0..count)
                    .map(|_| cursor.u24())
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(Self {
            length: desc.bytes[0],
            descriptor_type: desc.bytes[1],
            descriptor_subtype: desc.bytes[2],
            format_type,
            details,
            rates,
        })
    }

    /// Number of channels carried, when the format says so.
    pub fn channels(&self) -> Option<u8> {
        match self.details {
            FormatDetails::Pcm { channels, .. } => Some(channels),
            FormatDetails::Compressed { .. } => None,
        }
    }

    /// The rate table as clock ranges: a continuous table is one range of resolution 1, every
    /// discrete rate is a range of its own with resolution 0.
    pub fn frequency_ranges(&self) -> SmallVec<[FrequencyRange; 4]> {
        match &self.rates {
            SampleRates::Continuous { min, max } => smallvec::smallvec![FrequencyRange {
                min: *min,
                max: *max,
                resolution: 1,
            }],
            SampleRates::Discrete(rates) => rates
                .iter()
                .map(|rate| FrequencyRange {
                    min: *rate,
                    max: *rate,
                    resolution: 0,
                })
                .collect(),
        }
    }

    pub fn supports_frequency(&self, frequency: u32) -> bool {
        match &self.rates {
            SampleRates::Continuous { min, max } => *min <= frequency && frequency <= *max,
            SampleRates::Discrete(rates) => rates.contains(&frequency),
        }
    }

    /// Whether `other` describes a structurally compatible format.
    ///
    /// Matches when any one of bLength, bDescriptorType, bDescriptorSubtype or bFormatType is
    /// equal. Devices in the field have only been validated against this loose comparison.
    pub fn matches_structure(&self, other: &Self) -> bool {
        self.length == other.length
            || self.descriptor_type == other.descriptor_type
            || self.descriptor_subtype == other.descriptor_subtype
            || self.format_type == other.format_type
    }
}
