/// Název týmu → URL slug
///
/// `"Brighton & Hove Albion"` → `"brighton-and-hove-albion"`.
/// Za alfanumerické se považuje jen ASCII `[a-z0-9]`, vše ostatní je oddělovač.
/// Prázdný výsledek je možný (vstup bez písmen), řeší volající.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase().replace('&', "and");

    let mut out = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            out.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    out
}
