//! Rule-based guess of a canonical (quote-provider) symbol from a local ticker.
//!
//! Rules, first match wins:
//! 1. already suffixed (contains `.`) and not a `.LS` listing → unchanged
//! 2. `XXX.LS` → `XXX.L`
//! 3. `TOTB` → `TOTB.F`
//! 4. ends in `B` but not `AB` → `.F` (Frankfurt share-class codes)
//! 5. known Paris issuer codes → `.PA`
//! 6. alphabetic, at most 6 letters → `.PA`
//! 7. anything else → unchanged

/// Trimmed, uppercased form used as the mapping key.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_uppercase()
}

const PARIS_ISSUERS: &[&str] = &[
    "AIR", "ORA", "MC", "TTE", "BNP", "SGO", "ENGI", "SU", "DG", "ACA", "GLE", "RI", "KER", "HO",
    "EN", "CAP", "AI", "PUB", "VIE", "VIV", "STM",
];

const LOCAL_SUFFIX: &str = ".LS";

pub fn guess_canonical(raw: &str) -> Option<String> {
    let t = normalize_identifier(raw);
    if t.is_empty() {
        return None;
    }

    if t.contains('.') && !t.ends_with(LOCAL_SUFFIX) {
        return Some(t);
    }
    if let Some(stem) = t.strip_suffix(LOCAL_SUFFIX) {
        return Some(format!("{}.L", stem));
    }
    if t == "TOTB" {
        return Some("TOTB.F".to_string());
    }
    if t.ends_with('B') && !t.ends_with("AB") {
        return Some(format!("{}.F", t));
    }
    if PARIS_ISSUERS.contains(&t.as_str()) {
        return Some(format!("{}.PA", t));
    }
    if t.chars().count() <= 6 && t.chars().all(|c| c.is_alphabetic()) {
        return Some(format!("{}.PA", t));
    }
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(s: &str) -> String {
        guess_canonical(s).unwrap()
    }

    #[test]
    fn empty_input_has_no_guess() {
        assert_eq!(guess_canonical(""), None);
        assert_eq!(guess_canonical("   "), None);
    }

    #[test]
    fn suffixed_symbols_pass_through() {
        assert_eq!(guess("tte.pa"), "TTE.PA");
        assert_eq!(guess("SAP.DE"), "SAP.DE");
    }

    #[test]
    fn local_suffix_maps_to_london() {
        assert_eq!(guess("VOD.LS"), "VOD.L");
    }

    #[test]
    fn frankfurt_share_classes() {
        assert_eq!(guess("TOTB"), "TOTB.F");
        assert_eq!(guess("VOWB"), "VOWB.F");
        // AB endings are not share-class codes
        assert_eq!(guess("SAB"), "SAB.PA");
    }

    #[test]
    fn paris_issuers_and_short_codes() {
        assert_eq!(guess(" air "), "AIR.PA");
        assert_eq!(guess("MC"), "MC.PA");
        assert_eq!(guess("NVDA"), "NVDA.PA");
    }

    #[test]
    fn long_or_alphanumeric_codes_unchanged() {
        assert_eq!(guess("VOW3"), "VOW3");
        assert_eq!(guess("US0378331005"), "US0378331005");
        assert_eq!(guess("ABCDEFG"), "ABCDEFG");
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_identifier("  tte.pa\n"), "TTE.PA");
    }
}
