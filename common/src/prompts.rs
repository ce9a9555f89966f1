//! プロンプト定義
//!
//! 面（表/裏/不明）ごとの抽出指示。面は閉じた3値なので表引きで選ぶ。

use crate::types::Side;

const FRONT_PROMPT: &str = "Look at this photo and extract ALL visible text exactly as shown. Include:\
\n- Any captions or titles\
\n- Text on borders or frames\
\n- Stamps or watermarks\
\n- Any printed or handwritten text visible on the photo itself\
\n- Studio or photographer marks\
\n- Any numbers, codes, or identifiers\n\n\
Return ONLY text elements, no explanations or intros. \
List each on a new line. Optional short location prefix like 'top left corner:' is allowed.";

const BACK_PROMPT: &str = "Look at this photo back and extract ALL visible text exactly as shown. Include:\
\n- Any handwritten notes or annotations\
\n- Printed stamps or marks\
\n- Codes, numbers, or identifiers (preserve exact brackets/dashes)\
\n- Dates in any format\
\n- Names or descriptions\
\n- Developer/processor marks\n\n\
Return ONLY text elements, no explanations or intros. List each on a new line.";

const UNKNOWN_PROMPT: &str = "Extract ALL visible text exactly as shown, preserving characters and spacing. \
Return ONLY text elements (no explanations). List each on a new line.";

/// 面 → プロンプト
const PROMPTS: [(Side, &str); 3] = [
    (Side::Front, FRONT_PROMPT),
    (Side::Back, BACK_PROMPT),
    (Side::Unknown, UNKNOWN_PROMPT),
];

/// 面に対応する抽出プロンプトを返す
pub fn prompt_for(side: Side) -> &'static str {
    PROMPTS
        .iter()
        .find(|(s, _)| *s == side)
        .map(|(_, p)| *p)
        .unwrap_or(UNKNOWN_PROMPT)
}
