// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 内容规范化
//!
//! 响应式页面会把同一段文字渲染多次（可见文本与屏幕阅读器文本各一份），
//! 这里负责合并重复行、折叠空白并去掉“展开/收起”之类的交互文字。

/// 结尾处需要去掉的交互文字，按长度从长到短排列
const TRAILING_BOILERPLATE: &[&str] = &[
    "… see more",
    "...see more",
    "... see more",
    "…see more",
    "see more",
    "see less",
    "show more",
    "show less",
    "… more",
    "…more",
];

/// 近似重复判定的最短长度
const FUZZY_MIN_CHARS: usize = 20;
/// 近似重复判定的相似度阈值
const FUZZY_THRESHOLD: f64 = 0.9;

/// 规范化一组原始文本块
///
/// 每个文本块按空行拆分为段落，段落内按行清洗并去除连续重复行，
/// 最后在全部段落之间再去除一次连续重复。结果中每一项是一个段落，
/// 段落内的行以 `\n` 连接。
///
/// 该函数是幂等的，并且保持原有顺序。
pub fn normalize<S: AsRef<str>>(raw_blocks: &[S]) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();

    for block in raw_blocks {
        for paragraph in split_paragraphs(block.as_ref()) {
            let lines = dedupe_consecutive(paragraph.iter().map(|l| clean_line(l)));
            if lines.is_empty() {
                continue;
            }
            let joined = lines.join("\n");
            if paragraphs.last().is_some_and(|prev| is_near_duplicate(prev, &joined)) {
                continue;
            }
            paragraphs.push(joined);
        }
    }

    paragraphs
}

/// 规范化单段文本，空结果返回 `None`
pub fn normalize_text(raw: &str) -> Option<String> {
    let paragraphs = normalize(&[raw]);
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    }
}

/// 清洗单行文本：折叠空白、去掉结尾交互文字、合并首尾重复的两半，直到不再变化
pub fn clean_line(line: &str) -> String {
    let mut current = collapse_whitespace(line);
    loop {
        let next = collapse_doubled(&strip_boilerplate(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

fn split_paragraphs(block: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_boilerplate(line: &str) -> String {
    for suffix in TRAILING_BOILERPLATE {
        if line.len() < suffix.len() {
            continue;
        }
        let cut = line.len() - suffix.len();
        if !line.is_char_boundary(cut) || !line[cut..].eq_ignore_ascii_case(suffix) {
            continue;
        }
        let head = &line[..cut];
        // only a whole trailing token counts
        let standalone = head.is_empty()
            || head.ends_with(char::is_whitespace)
            || suffix.starts_with(['…', '.']);
        if standalone {
            return head.trim_end().to_string();
        }
    }
    line.to_string()
}

fn collapse_doubled(line: &str) -> String {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() >= 2 && words.len() % 2 == 0 {
        let (first, second) = words.split_at(words.len() / 2);
        if first == second {
            return first.join(" ");
        }
    }

    // "Software EngineerSoftware Engineer"
    let chars: Vec<char> = line.chars().collect();
    if chars.len() >= 8 && chars.len() % 2 == 0 {
        let (first, second) = chars.split_at(chars.len() / 2);
        if first == second && first[0].is_uppercase() {
            return first.iter().collect();
        }
    }

    line.to_string()
}

fn dedupe_consecutive(lines: impl Iterator<Item = String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if kept.last().is_some_and(|prev| is_near_duplicate(prev, &line)) {
            continue;
        }
        kept.push(line);
    }
    kept
}

/// 两段文本是否为近似重复
///
/// 忽略大小写完全相同，或两者都足够长且编辑距离相似度达到阈值
pub fn is_near_duplicate(a: &str, b: &str) -> bool {
    if a.to_lowercase() == b.to_lowercase() {
        return true;
    }
    if a.chars().count() < FUZZY_MIN_CHARS || b.chars().count() < FUZZY_MIN_CHARS {
        return false;
    }
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()) >= FUZZY_THRESHOLD
}
