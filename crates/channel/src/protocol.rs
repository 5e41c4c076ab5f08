//! Wire protocol: one UTF-8 text payload holding a base-10 integer code.
//!
//! | payload | command |
//! |---|---|
//! | `0` | `NoOp` |
//! | `1` | `StepForward` (x + 1) |
//! | `2` | `StepLeft` (z - 1) |
//! | `3` | `StepRight` (z + 1) |
//! | `4` | `StepBack` (x - 1) |
//!
//! Anything else is `NoOp`. All decoding goes through this module so the
//! protocol can change without touching the kernel.

use thiserror::Error;
use vantage_common::MovementCommand;

/// Why a payload did not name a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,
    #[error("payload {0:?} is not an integer")]
    NotAnInteger(String),
    #[error("unknown command code {0}")]
    UnknownCode(i64),
}

/// Strict decode. Surrounding whitespace is tolerated.
pub fn try_decode(payload: &str) -> Result<MovementCommand, DecodeError> {
    let code = payload
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::NotAnInteger(payload.to_owned()))?;
    if !(0..=4).contains(&code) {
        return Err(DecodeError::UnknownCode(code));
    }
    Ok(MovementCommand::from_code(code))
}

/// Lenient decode used by the listener: every failure becomes `NoOp`.
pub fn decode(payload: &str) -> MovementCommand {
    try_decode(payload).unwrap_or_else(|e| {
        tracing::debug!("ignoring payload: {e}");
        MovementCommand::NoOp
    })
}

/// Decode a binary frame as if it were text.
pub fn decode_bytes(payload: &[u8]) -> MovementCommand {
    match std::str::from_utf8(payload) {
        Ok(text) => decode(text),
        Err(_) => {
            tracing::debug!("ignoring payload: {}", DecodeError::NotUtf8);
            MovementCommand::NoOp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(decode("0"), MovementCommand::NoOp);
        assert_eq!(decode("1"), MovementCommand::StepForward);
        assert_eq!(decode("2"), MovementCommand::StepLeft);
        assert_eq!(decode("3"), MovementCommand::StepRight);
        assert_eq!(decode("4"), MovementCommand::StepBack);
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(decode(" 3\n"), MovementCommand::StepRight);
    }

    #[test]
    fn malformed_payloads_are_noop() {
        assert_eq!(decode("abc"), MovementCommand::NoOp);
        assert_eq!(decode(""), MovementCommand::NoOp);
        assert_eq!(decode("1.0"), MovementCommand::NoOp);
        assert_eq!(decode("99999999999999999999999"), MovementCommand::NoOp);
    }

    #[test]
    fn out_of_range_codes_are_noop() {
        assert_eq!(decode("5"), MovementCommand::NoOp);
        assert_eq!(decode("-1"), MovementCommand::NoOp);
        assert_eq!(try_decode("7"), Err(DecodeError::UnknownCode(7)));
    }

    #[test]
    fn strict_decode_reports_reason() {
        assert_eq!(
            try_decode("abc"),
            Err(DecodeError::NotAnInteger("abc".into()))
        );
        assert_eq!(try_decode("4"), Ok(MovementCommand::StepBack));
    }

    #[test]
    fn binary_frames() {
        assert_eq!(decode_bytes(b"1"), MovementCommand::StepForward);
        assert_eq!(decode_bytes(&[0xff, 0xfe]), MovementCommand::NoOp);
    }
}
