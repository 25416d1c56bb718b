//! Understat vkládá data do stránky jako
//! `var datesData = JSON.parse('\x5B\x7B\x22id\x22...')` — hex-escapovaný JS string.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

/// Datové proměnné, které nás na stránkách zajímají
pub const KNOWN_VARS: &[&str] = &["datesData", "teamsData", "playersData", "shotsData", "match_info"];

fn var_regex(var_name: &str) -> Result<Regex> {
    let pattern = format!(
        r"var\s+{}\s*=\s*JSON\.parse\(\s*'((?:[^'\\]|\\.)*)'\s*\)",
        regex::escape(var_name)
    );
    Regex::new(&pattern).with_context(|| format!("bad regex for {var_name}"))
}

/// Najde `var <name> = JSON.parse('...')` ve `<script>` tazích a vrátí naparsovaný JSON.
/// `Ok(None)` pokud proměnná na stránce není.
pub fn extract_embedded_json(html: &str, var_name: &str) -> Result<Option<Value>> {
    let document = Html::parse_document(html);
    let script_selector =
        Selector::parse("script").map_err(|e| anyhow!("script selector: {e:?}"))?;
    let re = var_regex(var_name)?;

    for script in document.select(&script_selector) {
        let text = script.text().collect::<String>();
        if let Some(caps) = re.captures(&text) {
            let decoded = decode_js_string(&caps[1])
                .with_context(|| format!("decode {var_name}"))?;
            let value = serde_json::from_str(&decoded)
                .with_context(|| format!("{var_name} JSON parse failed"))?;
            return Ok(Some(value));
        }
    }

    Ok(None)
}

/// Seznam proměnných z `KNOWN_VARS`, které stránka obsahuje (bez parsování)
pub fn present_vars(html: &str) -> Vec<&'static str> {
    KNOWN_VARS
        .iter()
        .copied()
        .filter(|name| var_regex(name).map(|re| re.is_match(html)).unwrap_or(false))
        .collect()
}

fn hex_value(digits: &str) -> Result<u32> {
    u32::from_str_radix(digits, 16).with_context(|| format!("bad hex escape \\{digits}"))
}

/// Dekóduje obsah JS string literálu. `\xNN` jsou bajty UTF-8, ne code pointy.
pub fn decode_js_string(raw: &str) -> Result<String> {
    let mut bytes: Vec<u8> = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut buf = [0u8; 4];

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let Some(esc) = chars.next() else {
            // koncové lomítko necháme být
            bytes.push(b'\\');
            break;
        };

        match esc {
            'x' => {
                let digits: String = chars.by_ref().take(2).collect();
                if digits.len() != 2 {
                    return Err(anyhow!("truncated \\x escape"));
                }
                bytes.push(hex_value(&digits)? as u8);
            }
            'u' => {
                let digits: String = chars.by_ref().take(4).collect();
                if digits.len() != 4 {
                    return Err(anyhow!("truncated \\u escape"));
                }
                let c = char::from_u32(hex_value(&digits)?).unwrap_or(char::REPLACEMENT_CHARACTER);
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            'n' => bytes.push(b'\n'),
            't' => bytes.push(b'\t'),
            'r' => bytes.push(b'\r'),
            'b' => bytes.push(0x08),
            'f' => bytes.push(0x0c),
            '0' => bytes.push(0),
            other => bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes()),
        }
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
