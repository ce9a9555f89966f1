//! 日付の柔軟な解析
//!
//! 写真の裏書きに現れる表記揺れの大きい日付を読む。
//! 1. コンパクト形（`26 6'95`）
//! 2. 前後に文章があっても拾うあいまい解析
//! 3. 19xx/20xx の年だけを拾うフォールバック

use crate::parser::DATE_COMPACT_RE;
use crate::types::ParsedDate;
use chrono::NaiveDate;
use regex::{Captures, Regex};

/// 2桁年の世紀の境目（これ以上は1900年代）
const CENTURY_PIVOT: u32 = 30;

const MONTH: &str = r"(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?";

lazy_static::lazy_static! {
    static ref ISO_RE: Regex = Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"\b(\d{1,2})(?:[-/.]|\s+)(\d{1,2})(?:[-/.]|\s+)(\d{4}|\d{2})\b").unwrap();
    // June 26, 1995
    static ref MONTH_DAY_YEAR_RE: Regex = Regex::new(
        &format!(r"(?i)\b{MONTH}\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b")
    ).unwrap();
    // 26 June 1995 / 26th of June, 1995
    static ref DAY_MONTH_YEAR_RE: Regex = Regex::new(
        &format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTH},?\s+(\d{{4}})\b")
    ).unwrap();
    // June 1995
    static ref MONTH_YEAR_RE: Regex = Regex::new(
        &format!(r"(?i)\b{MONTH},?\s+(\d{{4}})\b")
    ).unwrap();
    static ref YEAR_RE: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();
}

/// 日付文字列を解析する
///
/// 読めない場合は `None`（エラーではない）。
pub fn flexible_date_parse(text: &str) -> Option<ParsedDate> {
    parse_compact(text)
        .or_else(|| parse_fuzzy(text))
        .or_else(|| parse_year_only(text))
}

/// `日 月'年` 形式。暦として不正なら次の手段に回す
fn parse_compact(text: &str) -> Option<ParsedDate> {
    let caps = DATE_COMPACT_RE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let yy: u32 = caps[3].parse().ok()?;
    let year = expand_two_digit_year(yy);
    validated(year, Some(month), Some(day))
}

/// 文中の日付らしき部分を探す
fn parse_fuzzy(text: &str) -> Option<ParsedDate> {
    ISO_RE
        .captures_iter(text)
        .find_map(|c| validated(num(&c, 1)?, Some(num(&c, 2)?), Some(num(&c, 3)?)))
        .or_else(|| NUMERIC_RE.captures_iter(text).find_map(|c| numeric_date(&c)))
        .or_else(|| {
            MONTH_DAY_YEAR_RE.captures_iter(text).find_map(|c| {
                validated(num(&c, 3)?, month_number(&c[1]), Some(num(&c, 2)?))
            })
        })
        .or_else(|| {
            DAY_MONTH_YEAR_RE.captures_iter(text).find_map(|c| {
                validated(num(&c, 3)?, month_number(&c[2]), Some(num(&c, 1)?))
            })
        })
        .or_else(|| {
            MONTH_YEAR_RE
                .captures_iter(text)
                .find_map(|c| validated(num(&c, 2)?, month_number(&c[1]), None))
        })
}

/// 数値3要素（年が最後）。月が先の読み方を優先し、無理なら日が先
fn numeric_date(caps: &Captures) -> Option<ParsedDate> {
    let first: u32 = num(caps, 1)?;
    let second: u32 = num(caps, 2)?;
    let year_text = &caps[3];
    let year = if year_text.len() == 2 {
        expand_two_digit_year(year_text.parse().ok()?)
    } else {
        year_text.parse().ok()?
    };

    validated(year, Some(first), Some(second)).or_else(|| validated(year, Some(second), Some(first)))
}

fn parse_year_only(text: &str) -> Option<ParsedDate> {
    let m = YEAR_RE.find(text)?;
    let year: i32 = m.as_str().parse().ok()?;
    Some(ParsedDate::year_only(year))
}

/// 暦として成立する場合のみ ParsedDate を返す（欠けた部分は1として検証）
fn validated(year: i32, month: Option<u32>, day: Option<u32>) -> Option<ParsedDate> {
    let month = month?;
    NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1))?;
    Some(ParsedDate::new(year, Some(month), day))
}

fn expand_two_digit_year(yy: u32) -> i32 {
    let century = if yy >= CENTURY_PIVOT { 1900 } else { 2000 };
    century + yy as i32
}

fn num<T: std::str::FromStr>(caps: &Captures, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // コンパクト形
    // =============================================

    #[test]
    fn test_compact_form() {
        let parsed = flexible_date_parse("26 6'95").unwrap();
        assert_eq!(parsed, ParsedDate {
            year: 1995,
            month: Some(6),
            day: Some(26),
            iso: "1995-06-26".to_string(),
        });
    }

    #[test]
    fn test_compact_form_pivot() {
        assert_eq!(flexible_date_parse("3 4'10").unwrap().year, 2010);
        assert_eq!(flexible_date_parse("3 4'29").unwrap().year, 2029);
        assert_eq!(flexible_date_parse("3 4'30").unwrap().year, 1930);
    }

    #[test]
    fn test_compact_form_invalid_falls_through() {
        // 2月31日は不正 → 年だけのフォールバックへ
        let parsed = flexible_date_parse("31 2'95 printed 1996").unwrap();
        assert_eq!(parsed.year, 1996);
        assert_eq!(parsed.month, None);
    }

    // =============================================
    // あいまい解析
    // =============================================

    #[test]
    fn test_iso_in_sentence() {
        let parsed = flexible_date_parse("developed on 1988-07-04 by Kodak").unwrap();
        assert_eq!(parsed.iso, "1988-07-04");
        assert_eq!(parsed.day, Some(4));
    }

    #[test]
    fn test_numeric_month_first() {
        let parsed = flexible_date_parse("12/05/1980").unwrap();
        assert_eq!((parsed.year, parsed.month, parsed.day), (1980, Some(12), Some(5)));
    }

    #[test]
    fn test_numeric_day_first_when_month_impossible() {
        let parsed = flexible_date_parse("25.12.1979").unwrap();
        assert_eq!((parsed.year, parsed.month, parsed.day), (1979, Some(12), Some(25)));
    }

    #[test]
    fn test_numeric_two_digit_year() {
        let parsed = flexible_date_parse("7-4-76").unwrap();
        assert_eq!(parsed.iso, "1976-07-04");
    }

    #[test]
    fn test_month_names() {
        assert_eq!(flexible_date_parse("Christmas, December 25, 1964").unwrap().iso, "1964-12-25");
        assert_eq!(flexible_date_parse("4th of July 1976").unwrap().iso, "1976-07-04");
        assert_eq!(flexible_date_parse("sept. 3rd, 2001").unwrap().iso, "2001-09-03");
    }

    #[test]
    fn test_month_year_leaves_day_unset() {
        let parsed = flexible_date_parse("Easter April 1958").unwrap();
        assert_eq!(parsed.year, 1958);
        assert_eq!(parsed.month, Some(4));
        assert_eq!(parsed.day, None);
        assert_eq!(parsed.iso, "1958-04-01");
    }

    // =============================================
    // フォールバック
    // =============================================

    #[test]
    fn test_year_only_fallback() {
        let parsed = flexible_date_parse("random text 1987 more text").unwrap();
        assert_eq!(parsed, ParsedDate {
            year: 1987,
            month: None,
            day: None,
            iso: "1987-01-01".to_string(),
        });
    }

    #[test]
    fn test_year_fallback_requires_19_or_20() {
        assert!(flexible_date_parse("order 1850").is_none());
        assert!(flexible_date_parse("code 219876").is_none());
    }

    #[test]
    fn test_unparseable() {
        assert!(flexible_date_parse("").is_none());
        assert!(flexible_date_parse("no dates here").is_none());
        assert!(flexible_date_parse("99/99/99").is_none());
    }
}
