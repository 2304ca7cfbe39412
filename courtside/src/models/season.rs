//! Season labels of the form `YYYY-YY` (e.g. `2023-24`).

use regex::Regex;
use std::sync::OnceLock;

/// Most recent season the pipeline assumes when a query names none.
pub const CURRENT_SEASON: &str = "2024-25";

fn label_regex() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("season label regex"))
}

/// True when `label` is a well-formed season whose second half follows the first.
pub fn is_season_label(label: &str) -> bool {
    let Some(caps) = label_regex().captures(label) else {
        return false;
    };
    let (Ok(start), Ok(end)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return false;
    };
    (start + 1) % 100 == end
}

/// The season that ends in `year`: `2016` is the 2015-16 season.
pub fn season_ending_in(year: u32) -> Option<String> {
    if !(1947..=9999).contains(&year) {
        return None;
    }
    Some(format!("{}-{:02}", year - 1, year % 100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_season_label() {
        assert!(is_season_label("2023-24"));
        assert!(is_season_label("1999-00"));
        assert!(!is_season_label("2023-25"));
        assert!(!is_season_label("2023"));
        assert!(!is_season_label(" 2023-24"));
        assert!(!is_season_label(""));
    }

    #[test]
    fn test_season_ending_in() {
        assert_eq!(season_ending_in(2016).as_deref(), Some("2015-16"));
        assert_eq!(season_ending_in(2000).as_deref(), Some("1999-00"));
        assert_eq!(season_ending_in(1200), None);
    }
}
