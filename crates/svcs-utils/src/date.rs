use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::{FixedOffset, Local, Offset, TimeZone};

use crate::error::UtilError;
use crate::Result;

/// A timestamp with timezone information, as stored in commit objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Seconds since Unix epoch.
    pub seconds: i64,
    /// Timezone offset in minutes from UTC (e.g., -300 for EST).
    pub tz_offset: i32,
}

/// Parse the `±HHMM` decimal timezone form into minutes.
fn tz_offset_to_minutes(tz: i32) -> i32 {
    let sign = if tz < 0 { -1 } else { 1 };
    let abs = tz.unsigned_abs() as i32;
    sign * ((abs / 100) * 60 + abs % 100)
}

/// Convert minutes offset to the `±HHMM` decimal representation.
fn minutes_to_tz_offset(minutes: i32) -> i32 {
    let sign = if minutes < 0 { -1 } else { 1 };
    let abs = minutes.unsigned_abs() as i32;
    sign * ((abs / 60) * 100 + abs % 60)
}

impl Timestamp {
    /// Create a timestamp from Unix seconds and a timezone offset in minutes.
    pub fn new(seconds: i64, tz_offset_minutes: i32) -> Self {
        Self {
            seconds,
            tz_offset: tz_offset_minutes,
        }
    }

    /// The current time with the local timezone.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            seconds: now.timestamp(),
            tz_offset: now.offset().fix().local_minus_utc() / 60,
        }
    }

    /// Parse the raw commit-header form: `"<unix_secs> <±HHMM>"`.
    ///
    /// A missing timezone defaults to UTC.
    pub fn parse_raw(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut parts = input.splitn(2, ' ');

        let secs_str = parts.next().unwrap_or("");
        let seconds: i64 = secs_str
            .parse()
            .map_err(|_| UtilError::DateParse(format!("invalid timestamp: '{secs_str}'")))?;

        let tz_offset = match parts.next() {
            Some(tz_str) => {
                let tz_str = tz_str.trim();
                let tz: i32 = tz_str
                    .parse()
                    .map_err(|_| UtilError::DateParse(format!("invalid timezone: '{tz_str}'")))?;
                tz_offset_to_minutes(tz)
            }
            None => 0,
        };

        Ok(Self { seconds, tz_offset })
    }

    /// Format in the raw commit-header form: `"<unix_secs> <±HHMM>"`.
    pub fn to_raw(&self) -> String {
        format!("{} {:+05}", self.seconds, minutes_to_tz_offset(self.tz_offset))
    }

    /// Format as a human-readable local-offset date for log output,
    /// e.g. `"Thu Feb 13 23:31:30 2009 +0000"`.
    pub fn format_default(&self) -> String {
        let offset = FixedOffset::east_opt(self.tz_offset * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        match offset.timestamp_opt(self.seconds, 0).single() {
            Some(dt) => dt.format("%a %b %-d %H:%M:%S %Y %z").to_string(),
            None => self.to_raw(),
        }
    }
}

/// An author or committer identity with timestamp, as stored in commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub when: Timestamp,
}

impl Signature {
    /// Parse the commit-header form: `Name <email> timestamp tz`.
    pub fn parse(input: &BStr) -> Result<Self> {
        let input = input.as_bytes();

        let gt_pos = input
            .iter()
            .rposition(|&b| b == b'>')
            .ok_or_else(|| UtilError::SignatureParse("missing '>'".into()))?;
        let lt_pos = input[..gt_pos]
            .iter()
            .rposition(|&b| b == b'<')
            .ok_or_else(|| UtilError::SignatureParse("missing '<'".into()))?;

        let name = input[..lt_pos].trim();
        let email = &input[lt_pos + 1..gt_pos];

        let date_str = input[gt_pos + 1..].trim();
        let date_str = std::str::from_utf8(date_str)
            .map_err(|_| UtilError::SignatureParse("non-UTF-8 timestamp".into()))?;
        let when = Timestamp::parse_raw(date_str)?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            when,
        })
    }

    /// Parse an identity string without a timestamp: `Name <email>`.
    ///
    /// A bare name with no angle brackets is accepted with an empty email,
    /// matching what `--author` and `SVCS_AUTHOR` allow.
    pub fn parse_identity(input: &str, when: Timestamp) -> Result<Self> {
        let bytes = input.trim().as_bytes();
        if bytes.is_empty() {
            return Err(UtilError::SignatureParse("empty identity".into()));
        }

        match (bytes.find_byte(b'<'), bytes.rfind_byte(b'>')) {
            (Some(lt), Some(gt)) if lt < gt => Ok(Self {
                name: BString::from(bytes[..lt].trim()),
                email: BString::from(&bytes[lt + 1..gt]),
                when,
            }),
            (None, None) => Ok(Self {
                name: BString::from(bytes.trim()),
                email: BString::default(),
                when,
            }),
            _ => Err(UtilError::SignatureParse(format!(
                "malformed identity: '{input}'"
            ))),
        }
    }

    /// Format in the canonical commit-header form: `Name <email> timestamp tz`.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::new());
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(self.when.to_raw().as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BStr;

    #[test]
    fn raw_roundtrip() {
        let ts = Timestamp::parse_raw("1234567890 +0530").unwrap();
        assert_eq!(ts.seconds, 1234567890);
        assert_eq!(ts.tz_offset, 330);
        assert_eq!(ts.to_raw(), "1234567890 +0530");
    }

    #[test]
    fn negative_offset() {
        let ts = Timestamp::parse_raw("1000000000 -0500").unwrap();
        assert_eq!(ts.tz_offset, -300);
        assert_eq!(ts.to_raw(), "1000000000 -0500");
    }

    #[test]
    fn missing_tz_defaults_utc() {
        let ts = Timestamp::parse_raw("42").unwrap();
        assert_eq!(ts.tz_offset, 0);
    }

    #[test]
    fn invalid_timestamp() {
        assert!(Timestamp::parse_raw("not-a-number +0000").is_err());
    }

    #[test]
    fn signature_roundtrip() {
        let sig =
            Signature::parse(BStr::new(b"John Doe <john@example.com> 1234567890 +0000")).unwrap();
        assert_eq!(sig.name, "John Doe");
        assert_eq!(sig.email, "john@example.com");
        assert_eq!(sig.when.seconds, 1234567890);
        assert_eq!(
            sig.to_bytes(),
            BString::from("John Doe <john@example.com> 1234567890 +0000")
        );
    }

    #[test]
    fn signature_missing_brackets() {
        assert!(Signature::parse(BStr::new(b"no brackets 123 +0000")).is_err());
    }

    #[test]
    fn identity_with_email() {
        let when = Timestamp::new(100, 0);
        let sig = Signature::parse_identity("T <t@x>", when).unwrap();
        assert_eq!(sig.name, "T");
        assert_eq!(sig.email, "t@x");
    }

    #[test]
    fn identity_bare_name() {
        let when = Timestamp::new(100, 0);
        let sig = Signature::parse_identity("Just A Name", when).unwrap();
        assert_eq!(sig.name, "Just A Name");
        assert!(sig.email.is_empty());
    }

    #[test]
    fn identity_empty_rejected() {
        assert!(Signature::parse_identity("   ", Timestamp::new(0, 0)).is_err());
    }

    #[test]
    fn format_default_is_stable() {
        let ts = Timestamp::new(1234567890, 0);
        assert_eq!(ts.format_default(), "Fri Feb 13 23:31:30 2009 +0000");
    }
}
