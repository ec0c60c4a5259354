//! Khmer numerals and date wording

use chrono::{Datelike, NaiveDate};

/// Khmer digit glyphs indexed by value
const KHMER_DIGITS: [char; 10] = ['០', '១', '២', '៣', '៤', '៥', '៦', '៧', '៨', '៩'];

const KHMER_MONTHS: [&str; 12] = [
    "មករា",
    "កុម្ភៈ",
    "មីនា",
    "មេសា",
    "ឧសភា",
    "មិថុនា",
    "កក្កដា",
    "សីហា",
    "កញ្ញា",
    "តុលា",
    "វិច្ឆិកា",
    "ធ្នូ",
];

/// Replace each ASCII digit with its Khmer glyph; everything else is copied.
///
/// Only ASCII digits are recognised. There is no detection of numerals that
/// are already Khmer: they pass through untouched and are never normalised.
pub fn to_khmer_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => KHMER_DIGITS[d as usize],
            None => c,
        })
        .collect()
}

pub fn month_name(month: u32) -> &'static str {
    KHMER_MONTHS[((month.clamp(1, 12)) - 1) as usize]
}

/// `ថ្ងៃទី១ ខែតុលា ឆ្នាំ២០២៥`
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "ថ្ងៃទី{} ខែ{} ឆ្នាំ{}",
        to_khmer_digits(&date.day().to_string()),
        month_name(date.month()),
        to_khmer_digits(&date.year().to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_transliteration() {
        assert_eq!(to_khmer_digits("2025"), "២០២៥");
    }

    #[test]
    fn test_every_digit_maps_exactly() {
        assert_eq!(to_khmer_digits("0123456789"), "០១២៣៤៥៦៧៨៩");
        assert_eq!(to_khmer_digits("4,100,000"), "៤,១០០,០០០");
        assert_eq!(to_khmer_digits("Room B-12"), "Room B-១២");
    }

    #[test]
    fn test_second_pass_leaves_khmer_digits() {
        let once = to_khmer_digits("2025");
        assert_eq!(to_khmer_digits(&once), once);
        assert_eq!(to_khmer_digits("២០25"), "២០២៥");
    }

    #[test]
    fn test_khmer_date() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert_eq!(format_date(date), "ថ្ងៃទី១ ខែតុលា ឆ្នាំ២០២៥");
        assert_eq!(month_name(12), "ធ្នូ");
    }
}
