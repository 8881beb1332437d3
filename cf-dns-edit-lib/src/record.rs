//! DNS records and the editable draft used by the record forms.
//!
//! [`Record`] is what Cloudflare returned. [`RecordDraft`] is the in-memory
//! copy the user edits; every field change goes through
//! [`RecordDraft::apply`], which validates the input and leaves the draft
//! untouched when it is rejected.

#![forbid(unsafe_code)]

use std::fmt;

use crate::error::CfDnsError;

/// DNS record type.
///
/// Types the editor does not know about are kept verbatim in `Other` so that
/// a zone containing them can still be listed and edited.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    NS,
    SRV,
    CAA,
    PTR,
    Other(String),
}

impl RecordType {
    /// Types offered as a hint when prompting for a record type.
    pub const COMMON: [Self; 9] = [
        Self::A,
        Self::AAAA,
        Self::CNAME,
        Self::MX,
        Self::TXT,
        Self::NS,
        Self::SRV,
        Self::CAA,
        Self::PTR,
    ];

    /// Returns the wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::NS => "NS",
            Self::SRV => "SRV",
            Self::CAA => "CAA",
            Self::PTR => "PTR",
            Self::Other(other) => other,
        }
    }

    fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        let upper = value.trim().to_ascii_uppercase();
        Self::COMMON
            .into_iter()
            .find(|known| known.as_str() == upper)
            .unwrap_or(Self::Other(upper))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time to live in seconds. A value of 1 asks Cloudflare to pick it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ttl(u32);

impl Ttl {
    /// The "automatic" sentinel.
    pub const AUTO: Self = Self(1);

    /// Builds a TTL, folding anything below one second into [`Ttl::AUTO`].
    #[must_use]
    pub const fn new(seconds: u32) -> Self {
        if seconds < 1 {
            Self::AUTO
        } else {
            Self(seconds)
        }
    }

    #[must_use]
    pub const fn seconds(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_auto(self) -> bool {
        self.0 == Self::AUTO.0
    }

    /// Parses user input: `Auto` in any case, or an integer number of seconds.
    ///
    /// Integers below one normalize to [`Ttl::AUTO`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for anything that is neither `Auto` nor an
    /// integer that fits in 32 bits.
    pub fn parse(input: &str) -> Result<Self, CfDnsError> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("auto") {
            return Ok(Self::AUTO);
        }

        match input.parse::<i64>() {
            Ok(seconds) if seconds < 1 => Ok(Self::AUTO),
            Ok(seconds) => u32::try_from(seconds)
                .map(Self)
                .map_err(|_| CfDnsError::validation(format!("TTL {seconds} is too large."))),
            Err(_) => Err(CfDnsError::validation(
                "Invalid TTL value. Please enter a number or 'Auto'.",
            )),
        }
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::AUTO
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_auto() {
            f.write_str("Auto")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A DNS record as stored by Cloudflare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identifier assigned by Cloudflare.
    pub id: String,
    /// Zone the record belongs to.
    pub zone_id: String,
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub proxied: bool,
    pub comment: Option<String>,
    pub ttl: Ttl,
}

/// An editable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Type,
    Name,
    Content,
    Proxied,
    Comment,
    Ttl,
}

impl RecordField {
    /// All fields, in the order they are shown and prompted for.
    pub const ALL: [Self; 6] = [
        Self::Type,
        Self::Name,
        Self::Content,
        Self::Proxied,
        Self::Comment,
        Self::Ttl,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Name => "Name",
            Self::Content => "Content",
            Self::Proxied => "Proxied",
            Self::Comment => "Comment",
            Self::Ttl => "TTL",
        }
    }

    /// Prompt shown when asking the user for a value.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Type => "Enter record type (A, AAAA, CNAME, etc.)",
            Self::Name => "Enter record name",
            Self::Content => "Enter record content",
            Self::Proxied => "Proxied (yes/no)",
            Self::Comment => "Enter record comment (optional)",
            Self::Ttl => "Enter TTL (seconds) or 'Auto'",
        }
    }
}

/// In-memory copy of a record being created or edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    pub proxied: bool,
    pub comment: Option<String>,
    pub ttl: Ttl,
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            record_type: RecordType::Other(String::new()),
            name: String::new(),
            content: String::new(),
            proxied: false,
            comment: None,
            ttl: Ttl::AUTO,
        }
    }
}

impl From<&Record> for RecordDraft {
    fn from(record: &Record) -> Self {
        Self {
            record_type: record.record_type.clone(),
            name: record.name.clone(),
            content: record.content.clone(),
            proxied: record.proxied,
            comment: record.comment.clone(),
            ttl: record.ttl,
        }
    }
}

impl RecordDraft {
    /// Sets `field` from raw user input.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the draft unchanged, when a
    /// required field is empty or the TTL cannot be parsed.
    pub fn apply(&mut self, field: RecordField, input: &str) -> Result<(), CfDnsError> {
        let input = input.trim();
        match field {
            RecordField::Type => {
                let record_type = RecordType::from(required(field, input)?);
                self.record_type = record_type;
            }
            RecordField::Name => self.name = required(field, input)?.to_string(),
            RecordField::Content => self.content = required(field, input)?.to_string(),
            RecordField::Proxied => self.proxied = parse_yes_no(input),
            RecordField::Comment => {
                self.comment = (!input.is_empty()).then(|| input.to_string());
            }
            RecordField::Ttl => self.ttl = Ttl::parse(input)?,
        }
        Ok(())
    }

    /// Current value of `field`, formatted for display.
    #[must_use]
    pub fn display_value(&self, field: RecordField) -> String {
        let or_na = |value: &str| {
            if value.is_empty() {
                "N/A".to_string()
            } else {
                value.to_string()
            }
        };

        match field {
            RecordField::Type => or_na(self.record_type.as_str()),
            RecordField::Name => or_na(&self.name),
            RecordField::Content => or_na(&self.content),
            RecordField::Proxied => (if self.proxied { "Yes" } else { "No" }).to_string(),
            RecordField::Comment => or_na(self.comment.as_deref().unwrap_or_default()),
            RecordField::Ttl => self.ttl.to_string(),
        }
    }

    /// Checks the invariants a record must satisfy before it is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first empty required field.
    pub fn validate(&self) -> Result<(), CfDnsError> {
        if self.record_type.is_blank() {
            return Err(empty(RecordField::Type));
        }
        if self.name.trim().is_empty() {
            return Err(empty(RecordField::Name));
        }
        if self.content.trim().is_empty() {
            return Err(empty(RecordField::Content));
        }
        Ok(())
    }
}

fn required(field: RecordField, input: &str) -> Result<&str, CfDnsError> {
    if input.is_empty() {
        Err(empty(field))
    } else {
        Ok(input)
    }
}

fn empty(field: RecordField) -> CfDnsError {
    CfDnsError::validation(format!("{} cannot be empty.", field.label()))
}

fn parse_yes_no(input: &str) -> bool {
    ["yes", "y", "true"]
        .iter()
        .any(|yes| input.eq_ignore_ascii_case(yes))
}
