//! Protocol parsing for gamepad messages.
//!
//! Mirrors [`crate::serialize`]: full-state messages (`G...`) and
//! incremental updates (`U...`), each terminated by `*<crc8-hex>\n`.

use crate::crc::calculate_crc8;
use crate::types::{AnalogStick, Buttons, GamepadFieldUpdate, GamepadState};

/// Longest line this parser accepts, including the trailing `\n`.
pub const MAX_LINE_LENGTH: usize = 64;

/// Result of parsing a line through [`parse_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParsedMessage {
    FullState(GamepadState),
    Update(GamepadFieldUpdate),
}

/// Parse failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line exceeds [`MAX_LINE_LENGTH`] or is empty.
    InvalidLength,
    /// Missing the `\n` terminator.
    MissingTerminator,
    /// Missing the `*<checksum>` suffix.
    MissingChecksum,
    /// Checksum hex digits didn't parse, or didn't match the computed CRC-8.
    ChecksumMismatch,
    /// Prefix byte wasn't `G` or `U`.
    UnknownPrefix,
    /// An update field name wasn't one of `B`/`LX`/`LY`/`RX`/`RY`/`LT`/`RT`.
    UnknownField,
    /// A numeric field didn't parse as hex/decimal in range.
    MalformedField,
    /// A full-state message didn't have exactly 7 colon-separated fields.
    FieldCountMismatch,
}

/// Parse a full-state message (`G...`) and return its [`GamepadState`].
///
/// # Errors
///
/// Returns a [`ParseError`] variant for any malformed input, including a
/// well-formed `U...` update line (use [`parse_message`] if both message
/// kinds are expected).
pub fn parse(line: &[u8]) -> Result<GamepadState, ParseError> {
    match parse_message(line)? {
        ParsedMessage::FullState(state) => Ok(state),
        ParsedMessage::Update(_) => Err(ParseError::UnknownPrefix),
    }
}

/// Parse either message kind.
///
/// # Errors
///
/// See [`ParseError`] for the individual failure reasons.
pub fn parse_message(line: &[u8]) -> Result<ParsedMessage, ParseError> {
    if line.is_empty() || line.len() > MAX_LINE_LENGTH {
        return Err(ParseError::InvalidLength);
    }
    if line[line.len() - 1] != b'\n' {
        return Err(ParseError::MissingTerminator);
    }
    let body = &line[..line.len() - 1];

    let star = body
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(ParseError::MissingChecksum)?;
    let payload = &body[1..star];
    let checksum_hex = &body[star + 1..];
    if checksum_hex.len() != 2 {
        return Err(ParseError::ChecksumMismatch);
    }
    let expected = parse_hex_u8(checksum_hex).ok_or(ParseError::ChecksumMismatch)?;
    if calculate_crc8(payload) != expected {
        return Err(ParseError::ChecksumMismatch);
    }

    match body[0] {
        b'G' => parse_full_state(payload).map(ParsedMessage::FullState),
        b'U' => parse_update(payload).map(ParsedMessage::Update),
        _ => Err(ParseError::UnknownPrefix),
    }
}

fn parse_full_state(payload: &[u8]) -> Result<GamepadState, ParseError> {
    let mut fields = payload.split(|&b| b == b':');

    let buttons_hex = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    let lx = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    let ly = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    let rx = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    let ry = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    let lt = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    let rt = fields.next().ok_or(ParseError::FieldCountMismatch)?;
    if fields.next().is_some() {
        return Err(ParseError::FieldCountMismatch);
    }

    let buttons = Buttons(parse_hex_u16(buttons_hex).ok_or(ParseError::MalformedField)?);
    let left_stick = AnalogStick::new(
        parse_i16(lx).ok_or(ParseError::MalformedField)?,
        parse_i16(ly).ok_or(ParseError::MalformedField)?,
    );
    let right_stick = AnalogStick::new(
        parse_i16(rx).ok_or(ParseError::MalformedField)?,
        parse_i16(ry).ok_or(ParseError::MalformedField)?,
    );
    let left_trigger = parse_u8(lt).ok_or(ParseError::MalformedField)?;
    let right_trigger = parse_u8(rt).ok_or(ParseError::MalformedField)?;

    Ok(GamepadState {
        buttons,
        left_stick,
        right_stick,
        left_trigger,
        right_trigger,
    })
}

fn parse_update(payload: &[u8]) -> Result<GamepadFieldUpdate, ParseError> {
    let colon = payload
        .iter()
        .position(|&b| b == b':')
        .ok_or(ParseError::FieldCountMismatch)?;
    let field = &payload[..colon];
    let value = &payload[colon + 1..];

    match field {
        b"B" => Ok(GamepadFieldUpdate::Buttons(Buttons(
            parse_hex_u16(value).ok_or(ParseError::MalformedField)?,
        ))),
        b"LX" => Ok(GamepadFieldUpdate::LeftStickX(
            parse_i16(value).ok_or(ParseError::MalformedField)?,
        )),
        b"LY" => Ok(GamepadFieldUpdate::LeftStickY(
            parse_i16(value).ok_or(ParseError::MalformedField)?,
        )),
        b"RX" => Ok(GamepadFieldUpdate::RightStickX(
            parse_i16(value).ok_or(ParseError::MalformedField)?,
        )),
        b"RY" => Ok(GamepadFieldUpdate::RightStickY(
            parse_i16(value).ok_or(ParseError::MalformedField)?,
        )),
        b"LT" => Ok(GamepadFieldUpdate::LeftTrigger(
            parse_u8(value).ok_or(ParseError::MalformedField)?,
        )),
        b"RT" => Ok(GamepadFieldUpdate::RightTrigger(
            parse_u8(value).ok_or(ParseError::MalformedField)?,
        )),
        _ => Err(ParseError::UnknownField),
    }
}

fn hex_digit(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'A'..=b'F' => Some((b - b'A' + 10) as u32),
        b'a'..=b'f' => Some((b - b'a' + 10) as u32),
        _ => None,
    }
}

fn parse_hex_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let hi = hex_digit(bytes[0])?;
    let lo = hex_digit(bytes[1])?;
    Some(((hi << 4) | lo) as u8)
}

fn parse_hex_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut v: u32 = 0;
    for &b in bytes {
        v = (v << 4) | hex_digit(b)?;
    }
    Some(v as u16)
}

fn parse_i16(bytes: &[u8]) -> Option<i16> {
    let s = core::str::from_utf8(bytes).ok()?;
    s.parse::<i16>().ok()
}

fn parse_u8(bytes: &[u8]) -> Option<u8> {
    let s = core::str::from_utf8(bytes).ok()?;
    s.parse::<u8>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::Serialize;

    #[test]
    fn rejects_missing_newline() {
        let line = b"G0000:0:0:0:0:0:0*00";
        assert_eq!(parse_message(line), Err(ParseError::MissingTerminator));
    }

    #[test]
    fn rejects_bad_checksum() {
        let line = b"G0000:0:0:0:0:0:0*FF\n";
        assert_eq!(parse_message(line), Err(ParseError::ChecksumMismatch));
    }

    #[test]
    fn rejects_unknown_prefix() {
        let mut buf = [0u8; 64];
        let len = GamepadState::neutral().serialize(&mut buf).unwrap();
        buf[0] = b'X';
        // Corrupting the prefix invalidates neither the checksum field
        // position nor its value, so this exercises UnknownPrefix
        // specifically rather than a checksum failure.
        assert_eq!(
            parse_message(&buf[..len]),
            Err(ParseError::UnknownPrefix)
        );
    }

    #[test]
    fn rejects_line_too_long() {
        let line = [b'G'; MAX_LINE_LENGTH + 1];
        assert_eq!(parse_message(&line), Err(ParseError::InvalidLength));
    }
}
