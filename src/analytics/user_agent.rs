//! Browser family and device class from a raw User-Agent

use woothee::parser::Parser;

pub const UNKNOWN: &str = "UNKNOWN";

/// Device classes reported by the parser that are kept as-is
const KNOWN_DEVICE_TYPES: &[&str] = &["pc", "smartphone", "mobilephone", "appliance", "crawler"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub browser: String,
    pub device_type: String,
}

impl ParsedUserAgent {
    fn unknown() -> Self {
        Self {
            browser: UNKNOWN.to_string(),
            device_type: UNKNOWN.to_string(),
        }
    }
}

pub fn parse(user_agent: Option<&str>) -> ParsedUserAgent {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return ParsedUserAgent::unknown();
    };

    let parser = Parser::new();
    let Some(result) = parser.parse(ua) else {
        return ParsedUserAgent::unknown();
    };

    let browser = if result.name.is_empty() || result.name == UNKNOWN {
        UNKNOWN.to_string()
    } else {
        result.name.to_string()
    };
    let device_type = if KNOWN_DEVICE_TYPES.contains(&result.category) {
        result.category.to_string()
    } else {
        UNKNOWN.to_string()
    };

    ParsedUserAgent {
        browser,
        device_type,
    }
}
