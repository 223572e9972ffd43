//! Per-service descriptor decoding
//!
//! A descriptor has the form
//! `name@domain: { addr: 0a:55:44:33:22:11; vlan: 100; labels: k1=v1&k2=v2; payload: ETHERNET }`.
//! Only `addr` is required inside the braces; `payload` defaults to [`PAYLOAD_ETHERNET`].

use advmac::MacAddr6;
use nse_api::PAYLOAD_ETHERNET;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, DescriptorError, Result};

const ADDR_FIELD: &str = "addr";
const VLAN_FIELD: &str = "vlan";
const LABELS_FIELD: &str = "labels";
const PAYLOAD_FIELD: &str = "payload";

/// Decoded and validated configuration of one network service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub domain: String,
    pub payload: String,
    pub mac_addr: MacAddr6,
    pub vlan_tag: i32,
    pub labels: BTreeMap<String, String>,
}

impl ServiceConfig {
    /// Decode a single descriptor
    pub fn parse(text: &str) -> Result<Self> {
        parse_descriptor(text).map_err(|source| CoreError::InvalidDescriptor {
            descriptor: text.to_string(),
            source,
        })
    }

    /// MAC address in lowercase colon notation, e.g. `0a:55:44:33:22:11`
    pub fn mac_string(&self) -> String {
        format_mac(&self.mac_addr)
    }
}

impl FromStr for ServiceConfig {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}: {{ {}: {}; {}: {}",
            self.name,
            self.domain,
            ADDR_FIELD,
            self.mac_string(),
            VLAN_FIELD,
            self.vlan_tag
        )?;
        if !self.labels.is_empty() {
            let labels: Vec<String> = self
                .labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "; {}: {}", LABELS_FIELD, labels.join("&"))?;
        }
        write!(f, "; {}: {} }}", PAYLOAD_FIELD, self.payload)
    }
}

/// Decode a comma-separated list of descriptors, stopping at the first failure
pub fn parse_services(value: &str) -> Result<Vec<ServiceConfig>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ServiceConfig::parse)
        .collect()
}

/// Format a MAC address in lowercase colon notation
pub fn format_mac(mac: &MacAddr6) -> String {
    let octets: Vec<String> = mac.to_array().iter().map(|b| format!("{:02x}", b)).collect();
    octets.join(":")
}

/// Cursor over the descriptor text
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Text up to the first `delim`, consuming the delimiter
    fn take_until(&mut self, delim: char) -> std::result::Result<&'a str, DescriptorError> {
        let rest = self.rest();
        let idx = rest.find(delim).ok_or(DescriptorError::Expected(delim))?;
        self.pos += idx + delim.len_utf8();
        Ok(&rest[..idx])
    }

    /// Text up to the last `close`, consuming the delimiter
    fn take_block(&mut self, close: char) -> std::result::Result<&'a str, DescriptorError> {
        let rest = self.rest();
        let idx = rest.rfind(close).ok_or(DescriptorError::Expected(close))?;
        self.pos += idx + close.len_utf8();
        Ok(&rest[..idx])
    }

    fn expect(&mut self, ch: char) -> std::result::Result<(), DescriptorError> {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        if !trimmed.starts_with(ch) {
            return Err(DescriptorError::Expected(ch));
        }
        self.pos += rest.len() - trimmed.len() + ch.len_utf8();
        Ok(())
    }
}

/// Fields collected from the braced body before validation
struct Fields {
    payload: String,
    mac_addr: Option<MacAddr6>,
    vlan_tag: i32,
    labels: BTreeMap<String, String>,
}

impl Default for Fields {
    fn default() -> Self {
        Self {
            payload: PAYLOAD_ETHERNET.to_string(),
            mac_addr: None,
            vlan_tag: 0,
            labels: BTreeMap::new(),
        }
    }
}

fn parse_descriptor(text: &str) -> std::result::Result<ServiceConfig, DescriptorError> {
    let mut cursor = Cursor::new(text);

    let name = cursor.take_until('@')?.trim();
    let domain = cursor.take_until(':')?.trim();
    cursor.expect('{')?;
    let body = cursor.take_block('}')?;

    let trailing = cursor.rest().trim();
    if !trailing.is_empty() {
        return Err(DescriptorError::TrailingText(trailing.to_string()));
    }

    let mut fields = Fields::default();
    for segment in body.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        parse_field(segment, &mut fields)?;
    }

    validate(name, domain, fields)
}

fn parse_field(segment: &str, fields: &mut Fields) -> std::result::Result<(), DescriptorError> {
    let (key, value) = segment
        .split_once(':')
        .ok_or_else(|| DescriptorError::UnknownField(segment.to_string()))?;
    let value = value.trim();

    match key.trim() {
        ADDR_FIELD => fields.mac_addr = Some(parse_mac(value)?),
        VLAN_FIELD => fields.vlan_tag = parse_vlan(value)?,
        LABELS_FIELD => fields.labels = parse_labels(value)?,
        PAYLOAD_FIELD => fields.payload = value.to_string(),
        _ => return Err(DescriptorError::UnknownField(segment.to_string())),
    }
    Ok(())
}

fn parse_mac(value: &str) -> std::result::Result<MacAddr6, DescriptorError> {
    MacAddr6::parse_str(value).map_err(|e| DescriptorError::InvalidMacAddress {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a signed integer whose base is given by its prefix: `0x` hex, `0b` binary,
/// `0o` or a bare leading `0` octal, decimal otherwise
fn parse_vlan(value: &str) -> std::result::Result<i32, DescriptorError> {
    let invalid = |reason: &str| DescriptorError::InvalidVlanTag {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let (radix, digits) = if let Some(d) = strip_base_prefix(unsigned, 'x') {
        (16, d)
    } else if let Some(d) = strip_base_prefix(unsigned, 'b') {
        (2, d)
    } else if let Some(d) = strip_base_prefix(unsigned, 'o') {
        (8, d)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid("invalid syntax"));
    }

    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| invalid("value out of range"))?;
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).map_err(|_| invalid("value out of range"))
}

fn strip_base_prefix(s: &str, base: char) -> Option<&str> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some('0'), Some(c)) if c.eq_ignore_ascii_case(&base) => Some(&s[2..]),
        _ => None,
    }
}

fn parse_labels(value: &str) -> std::result::Result<BTreeMap<String, String>, DescriptorError> {
    let mut labels = BTreeMap::new();
    for pair in value.split('&') {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(val), None) if !key.trim().is_empty() => {
                labels.insert(key.trim().to_string(), val.trim().to_string());
            }
            _ => return Err(DescriptorError::InvalidKeyValue(pair.to_string())),
        }
    }
    Ok(labels)
}

fn validate(
    name: &str,
    domain: &str,
    fields: Fields,
) -> std::result::Result<ServiceConfig, DescriptorError> {
    if name.is_empty() {
        return Err(DescriptorError::EmptyName);
    }
    if domain.is_empty() {
        return Err(DescriptorError::EmptyDomain);
    }
    let mac_addr = fields.mac_addr.ok_or(DescriptorError::EmptyMacAddress)?;

    Ok(ServiceConfig {
        name: name.to_string(),
        domain: domain.to_string(),
        payload: fields.payload,
        mac_addr,
        vlan_tag: fields.vlan_tag,
        labels: fields.labels,
    })
}
