//! USB Audio 2.0 constants (UAC2 Appendix A).

/// bcdADC written into every synthesized Audio Control header.
pub const ADC_RELEASE: u16 = 0x0200;

/// Audio function categories (UAC2 A.7), written as bCategory.
pub const FUNCTION_CATEGORY_IO_BOX: u8 = 0x08;
pub const FUNCTION_CATEGORY_OTHER: u8 = 0xFF;

/// Audio Control interface descriptor subtypes (UAC2 A.9).
pub const HEADER: u8 = 0x01;
pub const INPUT_TERMINAL: u8 = 0x02;
pub const OUTPUT_TERMINAL: u8 = 0x03;
pub const MIXER_UNIT: u8 = 0x04;
pub const SELECTOR_UNIT: u8 = 0x05;
pub const FEATURE_UNIT: u8 = 0x06;
pub const EFFECT_UNIT: u8 = 0x07;
pub const PROCESSING_UNIT: u8 = 0x08;
pub const EXTENSION_UNIT: u8 = 0x09;
pub const CLOCK_SOURCE: u8 = 0x0A;
pub const CLOCK_SELECTOR: u8 = 0x0B;
pub const CLOCK_MULTIPLIER: u8 = 0x0C;

/// Effect unit effect types (UAC2 A.11).
pub const PARAM_EQ_SECTION_EFFECT: u16 = 0x01;
pub const REVERBERATION_EFFECT: u16 = 0x02;
pub const MOD_DELAY_EFFECT: u16 = 0x03;
pub const DYN_RANGE_COMP_EFFECT: u16 = 0x04;

/// Processing unit process types (UAC2 A.12).
pub const UP_DOWNMIX_PROCESS: u16 = 0x01;
pub const DOLBY_PROLOGIC_PROCESS: u16 = 0x02;
pub const STEREO_EXTENDER_PROCESS: u16 = 0x03;

/// Class-specific request codes (UAC2 A.14).
pub const CUR: u8 = 0x01;
pub const RANGE: u8 = 0x02;
pub const MEM: u8 = 0x03;

/// Clock source control selectors (UAC2 A.17.1).
pub const CS_SAM_FREQ_CONTROL: u8 = 0x01;
pub const CS_CLOCK_VALID_CONTROL: u8 = 0x02;

/// Clock selector control selectors (UAC2 A.17.2).
pub const CX_CLOCK_SELECTOR_CONTROL: u8 = 0x01;

/// Clock multiplier control selectors (UAC2 A.17.3).
pub const CM_NUMERATOR_CONTROL: u8 = 0x01;
pub const CM_DENOMINATOR_CONTROL: u8 = 0x02;

/// Terminal control selectors (UAC2 A.17.4).
pub const TE_COPY_PROTECT_CONTROL: u8 = 0x01;
pub const TE_CONNECTOR_CONTROL: u8 = 0x02;
pub const TE_OVERLOAD_CONTROL: u8 = 0x03;
pub const TE_CLUSTER_CONTROL: u8 = 0x04;
pub const TE_UNDERFLOW_CONTROL: u8 = 0x05;
pub const TE_OVERFLOW_CONTROL: u8 = 0x06;
pub const TE_LATENCY_CONTROL: u8 = 0x07;

/// Mixer control selectors (UAC2 A.17.5).
pub const MU_MIXER_CONTROL: u8 = 0x01;
pub const MU_CLUSTER_CONTROL: u8 = 0x02;
pub const MU_UNDERFLOW_CONTROL: u8 = 0x03;
pub const MU_OVERFLOW_CONTROL: u8 = 0x04;
pub const MU_LATENCY_CONTROL: u8 = 0x05;

/// Selector control selectors (UAC2 A.17.6).
pub const SU_SELECTOR_CONTROL: u8 = 0x01;
pub const SU_LATENCY_CONTROL: u8 = 0x02;

/// Feature unit control selectors (UAC2 A.17.7). Control `n` occupies bits `2(n-1)+1:2(n-1)`.
pub const FU_MUTE_CONTROL: u8 = 0x01;
pub const FU_VOLUME_CONTROL: u8 = 0x02;
pub const FU_BASS_CONTROL: u8 = 0x03;
pub const FU_MID_CONTROL: u8 = 0x04;
pub const FU_TREBLE_CONTROL: u8 = 0x05;
pub const FU_GRAPHIC_EQUALIZER_CONTROL: u8 = 0x06;
pub const FU_AUTOMATIC_GAIN_CONTROL: u8 = 0x07;
pub const FU_DELAY_CONTROL: u8 = 0x08;
pub const FU_BASS_BOOST_CONTROL: u8 = 0x09;
pub const FU_LOUDNESS_CONTROL: u8 = 0x0A;
pub const FU_INPUT_GAIN_CONTROL: u8 = 0x0B;
pub const FU_INPUT_GAIN_PAD_CONTROL: u8 = 0x0C;
pub const FU_PHASE_INVERTER_CONTROL: u8 = 0x0D;
pub const FU_UNDERFLOW_CONTROL: u8 = 0x0E;
pub const FU_OVERFLOW_CONTROL: u8 = 0x0F;
pub const FU_LATENCY_CONTROL: u8 = 0x10;

/// Effect unit control selectors (UAC2 A.17.8).
pub const RV_ENABLE_CONTROL: u8 = 0x01;
pub const RV_TYPE_CONTROL: u8 = 0x02;
pub const RV_LEVEL_CONTROL: u8 = 0x03;
pub const RV_TIME_CONTROL: u8 = 0x04;
pub const RV_FEEDBACK_CONTROL: u8 = 0x05;

pub const MD_ENABLE_CONTROL: u8 = 0x01;
pub const MD_BALANCE_CONTROL: u8 = 0x02;
pub const MD_RATE_CONTROL: u8 = 0x03;
pub const MD_DEPTH_CONTROL: u8 = 0x04;

pub const DR_ENABLE_CONTROL: u8 = 0x01;
pub const DR_COMPRESSION_RATE_CONTROL: u8 = 0x02;
pub const DR_MAXAMPL_CONTROL: u8 = 0x03;
pub const DR_THRESHOLD_CONTROL: u8 = 0x04;
pub const DR_ATTACK_TIME_CONTROL: u8 = 0x05;
pub const DR_RELEASE_TIME_CONTROL: u8 = 0x06;

/// Processing unit control selectors (UAC2 A.17.9).
pub const UD_ENABLE_CONTROL: u8 = 0x01;
pub const UD_MODE_SELECT_CONTROL: u8 = 0x02;
pub const DP_ENABLE_CONTROL: u8 = 0x01;
pub const DP_MODE_SELECT_CONTROL: u8 = 0x02;
pub const ST_EXT_ENABLE_CONTROL: u8 = 0x01;
pub const ST_EXT_WIDTH_CONTROL: u8 = 0x02;

/// Extension unit control selectors (UAC2 A.17.10).
pub const XU_ENABLE_CONTROL: u8 = 0x01;

/// Audio Streaming interface control selectors (UAC2 A.17.11).
pub const AS_ACT_ALT_SETTING_CONTROL: u8 = 0x01;
pub const AS_VAL_ALT_SETTINGS_CONTROL: u8 = 0x02;
pub const AS_AUDIO_DATA_FORMAT_CONTROL: u8 = 0x03;

/// Two-bit control field values in bmControls (UAC2 4.2).
pub const CONTROL_READ_ONLY: u8 = 0b01;
pub const CONTROL_PROGRAMMABLE: u8 = 0b11;

/// Clock source bmAttributes clock types (UAC2 4.7.2.1).
pub const CLOCK_TYPE_INTERNAL_FIXED: u8 = 0b01;
pub const CLOCK_TYPE_INTERNAL_PROGRAMMABLE: u8 = 0b11;

/// Class-specific descriptor sizes with no variable part.
pub const HEADER_SIZE: usize = 9;
pub const INPUT_TERMINAL_SIZE: usize = 17;
pub const OUTPUT_TERMINAL_SIZE: usize = 12;
pub const CLOCK_SOURCE_SIZE: usize = 8;
pub const CLOCK_MULTIPLIER_SIZE: usize = 7;
pub const AS_GENERAL_SIZE: usize = 16;
pub const AS_ISO_ENDPOINT_SIZE: usize = 8;

/// bmFormats bit for "raw data" Type I streams (UAC2 Frmts A.2.1).
pub const FORMAT_TYPE_I_RAW_DATA: u32 = 1 << 31;
