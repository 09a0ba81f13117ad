//! Record decoding and classification
//!
//! The device multiplexes two logical streams over one line channel: data to
//! persist and `ECHO:`-tagged diagnostics to display. `DONE` ends the stream
//! while the link itself stays open.

use thiserror::Error;

/// Prefix tagging a diagnostic line
pub const ECHO_PREFIX: &str = "ECHO:";

/// Line marking the end of the data stream
pub const TERMINATOR: &str = "DONE";

/// A line that is not plain ASCII
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line is not valid ASCII: byte {byte:#04x} at offset {offset}")]
pub struct DecodeError {
    /// Offending byte
    pub byte: u8,
    /// Offset of the byte within the line
    pub offset: usize,
}

/// A classified device line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Payload to append to the output file
    Data(&'a str),
    /// Diagnostic text for the operator, prefix and leading whitespace removed
    Echo(&'a str),
    /// End of stream
    Terminator,
    /// Nothing left after stripping the line terminator
    Blank,
}

/// Strip one trailing `\n` and then one trailing `\r`
fn strip_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Decode a raw line as ASCII text without its terminator
pub fn decode_line(raw: &[u8]) -> Result<&str, DecodeError> {
    let body = strip_terminator(raw);
    if let Some(offset) = body.iter().position(|b| !b.is_ascii()) {
        return Err(DecodeError {
            byte: body[offset],
            offset,
        });
    }
    std::str::from_utf8(body).map_err(|e| DecodeError {
        byte: body[e.valid_up_to()],
        offset: e.valid_up_to(),
    })
}

/// Classify a decoded line. Pure: the same text always yields the same record.
pub fn classify(text: &str) -> Record<'_> {
    if let Some(rest) = text.strip_prefix(ECHO_PREFIX) {
        return Record::Echo(rest.trim_start());
    }
    if text == TERMINATOR {
        return Record::Terminator;
    }
    if text.is_empty() {
        return Record::Blank;
    }
    Record::Data(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_strips_crlf() {
        assert_eq!(decode_line(b"12,34\r\n").unwrap(), "12,34");
        assert_eq!(decode_line(b"12,34\n").unwrap(), "12,34");
        assert_eq!(decode_line(b"12,34").unwrap(), "12,34");
        assert_eq!(decode_line(b"\r\n").unwrap(), "");
    }

    #[test]
    fn test_decode_only_strips_one_terminator() {
        assert_eq!(decode_line(b"a\r\n\n").unwrap(), "a\r\n");
    }

    #[test]
    fn test_decode_rejects_non_ascii() {
        let err = decode_line(b"temp \xb0C\r\n").unwrap_err();
        assert_eq!(err, DecodeError { byte: 0xB0, offset: 5 });
    }

    #[test]
    fn test_classify_echo() {
        assert_eq!(classify("ECHO:  hi there"), Record::Echo("hi there"));
        assert_eq!(classify("ECHO:"), Record::Echo(""));
        assert_eq!(classify("ECHO:DONE"), Record::Echo("DONE"));
    }

    #[test]
    fn test_classify_terminator_is_exact() {
        assert_eq!(classify("DONE"), Record::Terminator);
        assert_eq!(classify("DONE "), Record::Data("DONE "));
        assert_eq!(classify("done"), Record::Data("done"));
    }

    #[test]
    fn test_classify_data_and_blank() {
        assert_eq!(classify("1,2,3"), Record::Data("1,2,3"));
        assert_eq!(classify(" ECHO: not a tag"), Record::Data(" ECHO: not a tag"));
        assert_eq!(classify(""), Record::Blank);
    }
}
