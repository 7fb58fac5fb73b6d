//! @acp:module "Filename Markers"
//! @acp:summary "Decode (#n). (@). ($). filename prefixes"
//! @acp:domain build
//! @acp:layer parser

use std::sync::LazyLock;

use regex::Regex;

/// Matches a parenthesised marker followed by a dot: `(<marker>).<rest>`
static MARKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([^)]*)\)\.(.+)$").unwrap());

/// Decoded marker of one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// File name with the marker stripped
    pub canonical: String,
    /// Explicit order index, 0 when absent
    pub index: i64,
    /// `(@)` in-place asset
    pub asset: bool,
    /// `($)` in-place localized asset
    pub localized: bool,
}

impl Marker {
    fn plain(name: &str) -> Self {
        Self {
            canonical: name.to_string(),
            index: 0,
            asset: false,
            localized: false,
        }
    }
}

/// Decode a file name. `(@)` and `($)` only count inside a namespaced
/// folder. Returns the offending text when an order index does not parse.
pub fn decode(file_name: &str, namespaced: bool) -> Result<Marker, String> {
    let Some(caps) = MARKER_PATTERN.captures(file_name) else {
        return Ok(Marker::plain(file_name));
    };
    let inner = &caps[1];
    let rest = caps[2].to_string();

    if let Some(index) = inner.strip_prefix('#') {
        let index = index
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid order marker '({})'", inner))?;
        return Ok(Marker {
            canonical: rest,
            index,
            asset: false,
            localized: false,
        });
    }

    match inner {
        "@" if namespaced => Ok(Marker {
            canonical: rest,
            index: 0,
            asset: true,
            localized: false,
        }),
        "$" if namespaced => Ok(Marker {
            canonical: rest,
            index: 0,
            asset: false,
            localized: true,
        }),
        _ => Ok(Marker::plain(file_name)),
    }
}
