//! Airport and carrier reference data.
//!
//! Maps free-text places ("Toronto", "Paris CDG", "yvr") and carriers
//! ("Air Canada", "LH", flight code "AF1234") to the regulatory region they
//! belong to. APPR covers flights touching Canada; EU 261 covers departures
//! from the EU area (member states plus Iceland, Norway and Switzerland)
//! and arrivals there on an EU-area carrier.

use serde::{Deserialize, Serialize};

use crate::text::{contains_words, words};

/// Regulatory region of an airport or carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Canada,
    /// EU member states plus Iceland, Norway and Switzerland.
    Eu,
    Other,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canada => "canada",
            Self::Eu => "eu",
            Self::Other => "other",
        }
    }
}

struct Airport {
    code: &'static str,
    city: &'static str,
    region: Region,
}

const fn airport(code: &'static str, city: &'static str, region: Region) -> Airport {
    Airport { code, city, region }
}

const AIRPORTS: &[Airport] = &[
    // Canada
    airport("YYZ", "toronto", Region::Canada),
    airport("YTZ", "toronto", Region::Canada),
    airport("YVR", "vancouver", Region::Canada),
    airport("YUL", "montreal", Region::Canada),
    airport("YUL", "montréal", Region::Canada),
    airport("YYC", "calgary", Region::Canada),
    airport("YOW", "ottawa", Region::Canada),
    airport("YEG", "edmonton", Region::Canada),
    airport("YWG", "winnipeg", Region::Canada),
    airport("YHZ", "halifax", Region::Canada),
    airport("YQB", "quebec city", Region::Canada),
    airport("YYJ", "victoria", Region::Canada),
    airport("YXE", "saskatoon", Region::Canada),
    airport("YQR", "regina", Region::Canada),
    airport("YYT", "st john's", Region::Canada),
    // EU area
    airport("FRA", "frankfurt", Region::Eu),
    airport("MUC", "munich", Region::Eu),
    airport("BER", "berlin", Region::Eu),
    airport("CDG", "paris", Region::Eu),
    airport("ORY", "paris", Region::Eu),
    airport("NCE", "nice", Region::Eu),
    airport("MAD", "madrid", Region::Eu),
    airport("BCN", "barcelona", Region::Eu),
    airport("FCO", "rome", Region::Eu),
    airport("MXP", "milan", Region::Eu),
    airport("AMS", "amsterdam", Region::Eu),
    airport("BRU", "brussels", Region::Eu),
    airport("DUB", "dublin", Region::Eu),
    airport("LIS", "lisbon", Region::Eu),
    airport("VIE", "vienna", Region::Eu),
    airport("CPH", "copenhagen", Region::Eu),
    airport("ARN", "stockholm", Region::Eu),
    airport("HEL", "helsinki", Region::Eu),
    airport("ATH", "athens", Region::Eu),
    airport("WAW", "warsaw", Region::Eu),
    airport("PRG", "prague", Region::Eu),
    airport("ZRH", "zurich", Region::Eu),
    airport("GVA", "geneva", Region::Eu),
    airport("OSL", "oslo", Region::Eu),
    airport("KEF", "reykjavik", Region::Eu),
    // Elsewhere
    airport("LHR", "london", Region::Other),
    airport("LGW", "london", Region::Other),
    airport("MAN", "manchester", Region::Other),
    airport("JFK", "new york", Region::Other),
    airport("EWR", "newark", Region::Other),
    airport("LAX", "los angeles", Region::Other),
    airport("SFO", "san francisco", Region::Other),
    airport("ORD", "chicago", Region::Other),
    airport("MIA", "miami", Region::Other),
    airport("BOS", "boston", Region::Other),
    airport("SEA", "seattle", Region::Other),
    airport("DFW", "dallas", Region::Other),
    airport("ATL", "atlanta", Region::Other),
    airport("DEN", "denver", Region::Other),
    airport("LAS", "las vegas", Region::Other),
    airport("MEX", "mexico city", Region::Other),
    airport("CUN", "cancun", Region::Other),
    airport("IST", "istanbul", Region::Other),
    airport("DXB", "dubai", Region::Other),
    airport("NRT", "tokyo", Region::Other),
    airport("HND", "tokyo", Region::Other),
    airport("HKG", "hong kong", Region::Other),
    airport("SYD", "sydney", Region::Other),
];

const COUNTRIES: &[(&str, Region)] = &[
    ("canada", Region::Canada),
    ("germany", Region::Eu),
    ("france", Region::Eu),
    ("spain", Region::Eu),
    ("italy", Region::Eu),
    ("netherlands", Region::Eu),
    ("belgium", Region::Eu),
    ("ireland", Region::Eu),
    ("portugal", Region::Eu),
    ("austria", Region::Eu),
    ("denmark", Region::Eu),
    ("sweden", Region::Eu),
    ("finland", Region::Eu),
    ("greece", Region::Eu),
    ("poland", Region::Eu),
    ("switzerland", Region::Eu),
    ("norway", Region::Eu),
    ("iceland", Region::Eu),
    ("united states", Region::Other),
    ("usa", Region::Other),
    ("united kingdom", Region::Other),
    ("uk", Region::Other),
    ("mexico", Region::Other),
    ("japan", Region::Other),
];

/// Resolve a free-text place to its region.
///
/// Tries, in order: a three-letter IATA airport code anywhere in the text,
/// a known city name, then a country name. Returns `None` for unknown or
/// empty places.
pub fn locate(place: &str) -> Option<Region> {
    let tokens = words(place);
    if tokens.is_empty() {
        return None;
    }

    for token in tokens.iter().filter(|t| t.len() == 3) {
        if let Some(a) = AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(token)) {
            return Some(a.region);
        }
    }

    if let Some(a) = AIRPORTS
        .iter()
        .find(|a| contains_words(&tokens, &words(a.city)))
    {
        return Some(a.region);
    }

    COUNTRIES
        .iter()
        .find(|(name, _)| contains_words(&tokens, &words(name)))
        .map(|&(_, region)| region)
}

/// An airline with its IATA designator and home region.
#[derive(Debug, PartialEq, Eq)]
pub struct Carrier {
    pub designator: &'static str,
    pub name: &'static str,
    aliases: &'static [&'static str],
    pub region: Region,
}

const fn carrier(
    designator: &'static str,
    name: &'static str,
    aliases: &'static [&'static str],
    region: Region,
) -> Carrier {
    Carrier {
        designator,
        name,
        aliases,
        region,
    }
}

const CARRIERS: &[Carrier] = &[
    carrier("AC", "Air Canada", &["air canada rouge", "jazz"], Region::Canada),
    carrier("WS", "WestJet", &["westjet encore"], Region::Canada),
    carrier("PD", "Porter Airlines", &["porter"], Region::Canada),
    carrier("TS", "Air Transat", &["transat"], Region::Canada),
    carrier("F8", "Flair Airlines", &["flair"], Region::Canada),
    carrier("WG", "Sunwing Airlines", &["sunwing"], Region::Canada),
    carrier("LH", "Lufthansa", &["deutsche lufthansa"], Region::Eu),
    carrier("AF", "Air France", &[], Region::Eu),
    carrier("KL", "KLM", &["klm royal dutch airlines"], Region::Eu),
    carrier("IB", "Iberia", &[], Region::Eu),
    carrier("AZ", "ITA Airways", &["alitalia"], Region::Eu),
    carrier("SN", "Brussels Airlines", &[], Region::Eu),
    carrier("EI", "Aer Lingus", &[], Region::Eu),
    carrier("SK", "SAS", &["scandinavian airlines"], Region::Eu),
    carrier("TP", "TAP Air Portugal", &["tap portugal"], Region::Eu),
    carrier("FR", "Ryanair", &[], Region::Eu),
    carrier("OS", "Austrian Airlines", &["austrian"], Region::Eu),
    carrier("LX", "Swiss International Air Lines", &["swiss"], Region::Eu),
    carrier("AY", "Finnair", &[], Region::Eu),
    carrier("BA", "British Airways", &[], Region::Other),
    carrier("U2", "easyJet", &[], Region::Other),
    carrier("UA", "United Airlines", &["united"], Region::Other),
    carrier("AA", "American Airlines", &["american"], Region::Other),
    carrier("DL", "Delta Air Lines", &["delta"], Region::Other),
    carrier("EK", "Emirates", &[], Region::Other),
    carrier("TK", "Turkish Airlines", &["turkish"], Region::Other),
];

impl Carrier {
    fn matches_name(&self, tokens: &[String]) -> bool {
        contains_words(tokens, &words(self.name))
            || self.aliases.iter().any(|a| contains_words(tokens, &words(a)))
    }
}

/// Look up a carrier by name, alias, or bare IATA designator.
pub fn carrier_by_name(text: &str) -> Option<&'static Carrier> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(c) = CARRIERS
        .iter()
        .find(|c| c.designator.eq_ignore_ascii_case(trimmed))
    {
        return Some(c);
    }
    let tokens = words(trimmed);
    CARRIERS.iter().find(|c| c.matches_name(&tokens))
}

/// Look up the marketing carrier of a flight code such as `AC123`.
pub fn carrier_by_flight_code(code: &str) -> Option<&'static Carrier> {
    let designator = designator(code)?;
    CARRIERS.iter().find(|c| c.designator == designator)
}

/// Two-character IATA carrier designator at the start of a flight code.
///
/// Returns `None` when the code is too short to hold a flight number, or
/// when the prefix is purely numeric.
pub fn designator(code: &str) -> Option<String> {
    let compact: String = code
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    let prefix: String = compact.chars().take(2).collect();
    if compact.chars().count() < 3
        || prefix.chars().count() < 2
        || !prefix.chars().all(|c| c.is_ascii_alphanumeric())
        || prefix.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some(prefix)
}
