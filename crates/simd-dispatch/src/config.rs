//! Backend selection surface.
//!
//! Selection comes from two places, in decreasing precedence:
//!
//! 1. the `scalar-only` Cargo feature, the compile-time form of `none`;
//! 2. the `SIMDCAP_BACKEND` environment variable, read once when the process
//!    first resolves its instruction set.
//!
//! Absent both, selection is [`Selection::Auto`].

use std::env;
use std::ffi::OsStr;
use std::str::FromStr;

use crate::error::SelectionParseError;
use crate::instruction_set::InstructionSet;
use crate::trace;

/// Environment variable consulted by [`DetectorConfig::from_env`].
pub const BACKEND_ENV: &str = "SIMDCAP_BACKEND";

const EXPECTED: &str = "auto, sse2, neon, 3dnow, altivec, none";

/// Which backend the detector should settle on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Selection {
    /// Pick the highest-priority facility the host supports.
    #[default]
    Auto,
    /// Use the scalar fallback regardless of host support.
    Disabled,
    /// Use this vector facility if the host supports it, otherwise scalar.
    Force(InstructionSet),
}

impl FromStr for Selection {
    type Err = SelectionParseError;

    /// Parses `auto`, `none` (aliases `scalar`, `off`) or a vector facility
    /// name. Matching ignores ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        match lowered.as_str() {
            "auto" | "" => Ok(Self::Auto),
            "none" | "scalar" | "off" => Ok(Self::Disabled),
            "sse2" => Ok(Self::Force(InstructionSet::Sse2)),
            "neon" => Ok(Self::Force(InstructionSet::Neon)),
            "3dnow" | "3dnow!" | "mmx" => Ok(Self::Force(InstructionSet::ThreeDNow)),
            "altivec" | "vmx" => Ok(Self::Force(InstructionSet::AltiVec)),
            _ => Err(SelectionParseError::new(trimmed, EXPECTED)),
        }
    }
}

/// Inputs the [`Detector`](crate::Detector) resolves against besides the
/// host's own capabilities.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DetectorConfig {
    selection: Selection,
}

impl DetectorConfig {
    /// Configuration with an explicit selection.
    #[must_use]
    pub const fn new(selection: Selection) -> Self {
        Self { selection }
    }

    /// Configuration that always resolves to scalar.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(Selection::Disabled)
    }

    /// Builds the process configuration from the build features and the
    /// [`BACKEND_ENV`] variable.
    ///
    /// An unparsable value is reported through tracing and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        if cfg!(feature = "scalar-only") {
            return Self::disabled();
        }
        Self::from_env_value(env::var_os(BACKEND_ENV).as_deref())
    }

    pub(crate) fn from_env_value(value: Option<&OsStr>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };

        let Some(text) = value.to_str() else {
            trace::invalid_selection(&value.to_string_lossy(), "value is not valid UTF-8");
            return Self::default();
        };

        match text.parse::<Selection>() {
            Ok(selection) => Self::new(selection),
            Err(err) => {
                trace::invalid_selection(err.value(), &err.to_string());
                Self::default()
            }
        }
    }

    /// The configured selection.
    #[must_use]
    pub const fn selection(self) -> Selection {
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_documented_name() {
        let cases = [
            ("auto", Selection::Auto),
            ("none", Selection::Disabled),
            ("scalar", Selection::Disabled),
            ("sse2", Selection::Force(InstructionSet::Sse2)),
            ("neon", Selection::Force(InstructionSet::Neon)),
            ("3dnow", Selection::Force(InstructionSet::ThreeDNow)),
            ("altivec", Selection::Force(InstructionSet::AltiVec)),
        ];
        for (text, expected) in cases {
            assert_eq!(text.parse::<Selection>(), Ok(expected), "{text}");
        }
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(
            "  AltiVec\n".parse::<Selection>(),
            Ok(Selection::Force(InstructionSet::AltiVec))
        );
        assert_eq!("OFF".parse::<Selection>(), Ok(Selection::Disabled));
    }

    #[test]
    fn instruction_set_names_round_trip_through_selection() {
        for set in InstructionSet::VECTOR_PRIORITY {
            assert_eq!(set.name().parse::<Selection>(), Ok(Selection::Force(set)));
        }
    }

    #[test]
    fn unknown_name_is_rejected_with_the_input() {
        let err = "avx9".parse::<Selection>().unwrap_err();
        assert_eq!(err.value(), "avx9");
        assert!(err.to_string().contains("altivec"));
    }

    #[test]
    fn env_value_falls_back_to_auto() {
        assert_eq!(
            DetectorConfig::from_env_value(None),
            DetectorConfig::default()
        );
        assert_eq!(
            DetectorConfig::from_env_value(Some(OsStr::new("bogus"))).selection(),
            Selection::Auto
        );
        assert_eq!(
            DetectorConfig::from_env_value(Some(OsStr::new("none"))).selection(),
            Selection::Disabled
        );
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn unparsable_env_value_is_reported() {
        let (config, events) = test_support::capture_events(|| {
            DetectorConfig::from_env_value(Some(OsStr::new("bogus")))
        });
        assert_eq!(config.selection(), Selection::Auto);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.target, crate::trace::DETECT_TARGET);
        assert_eq!(event.level, tracing::Level::WARN);
        assert_eq!(event.field("value"), Some("bogus"));
        let reason = event.field("reason").unwrap_or_default();
        assert!(reason.contains("altivec"), "{reason}");
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn valid_env_value_is_silent() {
        let (config, events) = test_support::capture_events(|| {
            DetectorConfig::from_env_value(Some(OsStr::new("sse2")))
        });
        assert_eq!(config.selection(), Selection::Force(InstructionSet::Sse2));
        assert!(events.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_env_value_falls_back_to_auto() {
        use std::os::unix::ffi::OsStrExt;

        let value = OsStr::from_bytes(&[0x73, 0xff, 0x65]);
        assert_eq!(
            DetectorConfig::from_env_value(Some(value)).selection(),
            Selection::Auto
        );
    }
}
