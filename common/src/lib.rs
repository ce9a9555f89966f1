//! Photo OCR Common Library
//!
//! モデル応答の分類、パターン学習、表裏ペア作成、統合、集計。
//! I/Oを持たない部分をCLIから切り離して置く。

pub mod types;
pub mod error;
pub mod prompts;
pub mod parser;
pub mod dates;
pub mod patterns;
pub mod pairing;
pub mod merger;
pub mod report;

pub use types::{
    Analysis, Classification, CollectionReport, CombinedMetadata, DateRecord, ExtractedElements,
    ExtractionResult, IdentifiedPatterns, PairingStrategy, ParsedDate, PatternFrequency, PatternKind,
    PatternRecord, PhotoPair, PhotoRecord, Side, SideResult, SpecialPattern,
};
pub use error::{Error, Result};
pub use prompts::prompt_for;
pub use parser::parse_raw_response;
pub use dates::flexible_date_parse;
pub use patterns::{abstract_pattern, decompose, PatternLibrary};
pub use pairing::create_pairs;
pub use merger::merge_metadata;
pub use report::{build_report, summary_rows, SummaryRow};
