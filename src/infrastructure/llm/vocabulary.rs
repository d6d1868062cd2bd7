//! Translation of the vocabularies decision models have been seen to answer
//! in, into the strict one the pipeline parses.

/// Maps a decision verb to LONG/SHORT/WATCH/IGNORE. Unrecognised verbs are
/// returned uppercased so the pipeline can reject them.
pub fn normalize_action(raw: &str) -> String {
    let upper = fold(raw);
    let mapped = match upper.as_str() {
        "LONG" | "BUY" | "ACHETER" | "ACHAT" => "LONG",
        "SHORT" | "SELL" | "VENDRE" | "VENTE" => "SHORT",
        "WATCH" | "HOLD" | "SURVEILLER" => "WATCH",
        "IGNORE" | "PASS" | "IGNORER" => "IGNORE",
        _ => return upper,
    };
    mapped.to_string()
}

/// Maps a confidence label to HIGH/MEDIUM/LOW. Unknown labels give `None`.
pub fn normalize_confidence(raw: &str) -> Option<String> {
    let mapped = match fold(raw).as_str() {
        "HIGH" | "ELEVEE" | "HAUTE" | "FORTE" => "HIGH",
        "MEDIUM" | "MODERATE" | "MOYENNE" => "MEDIUM",
        "LOW" | "FAIBLE" | "BASSE" => "LOW",
        _ => return None,
    };
    Some(mapped.to_string())
}

/// Placeholder tickers ("null", "N/A", ...) become `None`.
pub fn normalize_ticker(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    match fold(trimmed).as_str() {
        "" | "NULL" | "NONE" | "N/A" | "NA" | "-" => None,
        _ => Some(trimmed.to_string()),
    }
}

fn fold(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'É' | 'È' | 'Ê' => 'E',
            other => other,
        })
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_vocabulary() {
        assert_eq!(normalize_action("acheter"), "LONG");
        assert_eq!(normalize_action("BUY"), "LONG");
        assert_eq!(normalize_action("Vendre"), "SHORT");
        assert_eq!(normalize_action("SURVEILLER"), "WATCH");
        assert_eq!(normalize_action("ignorer"), "IGNORE");
        assert_eq!(normalize_action("long"), "LONG");
        assert_eq!(normalize_action("maybe"), "MAYBE");
    }

    #[test]
    fn test_confidence_vocabulary() {
        assert_eq!(normalize_confidence("ÉLEVÉE").as_deref(), Some("HIGH"));
        assert_eq!(normalize_confidence("moyenne").as_deref(), Some("MEDIUM"));
        assert_eq!(normalize_confidence("FAIBLE").as_deref(), Some("LOW"));
        assert_eq!(normalize_confidence("???"), None);
    }

    #[test]
    fn test_placeholder_tickers() {
        assert_eq!(normalize_ticker(Some("null")), None);
        assert_eq!(normalize_ticker(Some(" N/A ")), None);
        assert_eq!(normalize_ticker(None), None);
        assert_eq!(normalize_ticker(Some("AAPL")).as_deref(), Some("AAPL"));
    }
}
