//! 表裏の統合
//!
//! 表・裏それぞれの抽出/解析結果を1つの CombinedMetadata にまとめる。
//! 表 → 裏 の順で連結し、面をまたいだ重複排除はしない。

use crate::types::{Classification, CombinedMetadata, SideResult};

/// 表裏の結果を統合する（どちらも無くてよい）
pub fn merge_metadata(front: Option<&SideResult>, back: Option<&SideResult>) -> CombinedMetadata {
    let mut metadata = CombinedMetadata::default();

    for side in [front, back].into_iter().flatten() {
        metadata
            .all_text
            .extend(side.raw.text_lines().iter().cloned());

        for classification in side.analysis.identified_patterns.values() {
            match classification {
                Classification::Code(record) => metadata.codes.push(record.clone()),
                Classification::Date(record) => metadata.dates.push(record.clone()),
            }
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_raw_response;
    use crate::patterns::PatternLibrary;
    use crate::types::{Analysis, ExtractionResult, Side};

    fn side_result(library: &mut PatternLibrary, file: &str, side: Side, response: &str) -> SideResult {
        let elements = parse_raw_response(response);
        let analysis = library.analyze_and_learn(&elements);
        SideResult {
            raw: ExtractionResult::success(file.to_string(), side, response.to_string(), elements),
            analysis,
        }
    }

    #[test]
    fn test_merge_front_then_back() {
        let mut library = PatternLibrary::new();
        let front = side_result(&mut library, "f.jpg", Side::Front, "Kodak (A1)\nSummer 1972");
        let back = side_result(&mut library, "b.jpg", Side::Back, "KD12-345 <A> STU\n26 6'95");

        let merged = merge_metadata(Some(&front), Some(&back));

        assert_eq!(
            merged.all_text,
            vec!["Kodak (A1)", "Summer 1972", "KD12-345 <A> STU", "26 6'95"]
        );
        assert_eq!(merged.codes.len(), 2);
        assert_eq!(merged.codes[0].pattern, "Aaaaa?(AD)");
        assert_eq!(merged.codes[1].pattern, "AADD-DDD?<A>?AAA");
        assert_eq!(merged.dates.len(), 2);
        assert_eq!(merged.dates[0].parsed.year, 1972);
        assert_eq!(merged.dates[1].parsed.iso, "1995-06-26");
        assert!(merged.names.is_empty());
        assert!(merged.locations.is_empty());
    }

    #[test]
    fn test_merge_no_dedup_across_sides() {
        let mut library = PatternLibrary::new();
        let front = side_result(&mut library, "f.jpg", Side::Front, "#12");
        let back = side_result(&mut library, "b.jpg", Side::Back, "#12");

        let merged = merge_metadata(Some(&front), Some(&back));
        assert_eq!(merged.all_text, vec!["#12", "#12"]);
        assert_eq!(merged.codes.len(), 2);
    }

    #[test]
    fn test_merge_back_only() {
        let mut library = PatternLibrary::new();
        let back = side_result(&mut library, "b.jpg", Side::Back, "1980");
        let merged = merge_metadata(None, Some(&back));
        assert_eq!(merged.all_text, vec!["1980"]);
        assert!(merged.codes.is_empty());
        assert_eq!(merged.dates.len(), 1);
    }

    #[test]
    fn test_merge_failed_side_contributes_nothing() {
        let failed = SideResult {
            raw: ExtractionResult::failure("f.jpg".to_string(), Side::Front, "rate limit".to_string()),
            analysis: Analysis::default(),
        };
        let merged = merge_metadata(Some(&failed), None);
        assert_eq!(merged, CombinedMetadata::default());
    }

    #[test]
    fn test_merge_nothing() {
        assert_eq!(merge_metadata(None, None), CombinedMetadata::default());
    }
}
