//! Turns a loosely formatted lesson body into typed [`LessonBlock`]s.
//!
//! The body is split into paragraph segments on runs of two or more newlines.
//! Each segment is classified on its own by looking for a bolded label
//! (`**Watch:**`, `**Key Points**`, ...) anywhere in the segment, or a
//! `**Label` prefix at its very start. The first matching rule wins.

use crate::model::{BlockKind, LessonBlock, WATCH_PLACEHOLDER_URL};

/// Labels in priority order.
const LABELS: [(&str, BlockKind); 8] = [
    ("Watch", BlockKind::Watch),
    ("Try it", BlockKind::TryIt),
    ("Quiz", BlockKind::Quiz),
    ("Diagram", BlockKind::Diagram),
    ("Example", BlockKind::Example),
    ("Interactive", BlockKind::Interactive),
    ("Key Points", BlockKind::KeyPoints),
    ("Best Practices", BlockKind::BestPractices),
];

/// Classify a lesson body into an ordered sequence of blocks.
///
/// Whitespace-only input yields no blocks. Empty segments produced by
/// leading or trailing blank lines are dropped; every other segment yields
/// exactly one block, in source order.
///
/// ```
/// # use learn_core::classifier::classify;
/// # use learn_core::model::LessonBlock;
/// let blocks = classify("Intro text.\n\n**Quiz:** - What is a signature?");
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(
///     blocks[1],
///     LessonBlock::Quiz { question: "What is a signature?".into() }
/// );
/// ```
#[must_use]
pub fn classify(text: &str) -> Vec<LessonBlock> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    split_segments(text)
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .map(classify_segment)
        .collect()
}

/// Split on every run of two or more `\n`, keeping single newlines inside segments.
fn split_segments(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let run_start = i;
            while i < bytes.len() && bytes[i] == b'\n' {
                i += 1;
            }
            if i - run_start >= 2 {
                segments.push(&text[start..run_start]);
                start = i;
            }
        } else {
            i += 1;
        }
    }
    segments.push(&text[start..]);
    segments
}

fn classify_segment(segment: &str) -> LessonBlock {
    let Some((kind, label)) = LABELS
        .iter()
        .find(|(label, _)| has_label(segment, label))
        .map(|(label, kind)| (*kind, *label))
    else {
        return LessonBlock::Narrative {
            markdown: segment.to_owned(),
        };
    };

    match kind {
        BlockKind::Watch => LessonBlock::Watch {
            url: first_http_link(segment)
                .unwrap_or(WATCH_PLACEHOLDER_URL)
                .to_owned(),
        },
        BlockKind::TryIt => LessonBlock::TryIt {
            body: strip_leading_marker(&strip_label(segment, label), '>'),
        },
        BlockKind::Quiz => LessonBlock::Quiz {
            question: strip_leading_marker(&strip_label(segment, label), '-'),
        },
        BlockKind::Diagram => LessonBlock::Diagram {
            body: strip_label(segment, label).trim().to_owned(),
        },
        BlockKind::Example => LessonBlock::Example {
            body: strip_label(segment, label).trim().to_owned(),
        },
        BlockKind::Interactive => LessonBlock::Interactive {
            body: strip_label(segment, label).trim().to_owned(),
        },
        BlockKind::KeyPoints => LessonBlock::KeyPoints {
            points: bullet_points(segment, label),
        },
        BlockKind::BestPractices => LessonBlock::BestPractices {
            points: bullet_points(segment, label),
        },
        BlockKind::Narrative => LessonBlock::Narrative {
            markdown: segment.to_owned(),
        },
    }
}

fn has_label(segment: &str, label: &str) -> bool {
    segment.starts_with(&format!("**{label}")) || find_bold_label(segment, label).is_some()
}

/// Byte range of the first `**Label**` or `**Label:**`, ignoring ASCII case.
fn find_bold_label(segment: &str, label: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(offset) = segment[from..].find("**") {
        let open = from + offset;
        let name_start = open + 2;
        let name_end = name_start + label.len();
        if let Some(name) = segment.get(name_start..name_end) {
            if name.eq_ignore_ascii_case(label) {
                let rest = &segment[name_end..];
                let colon = usize::from(rest.starts_with(':'));
                if rest[colon..].starts_with("**") {
                    return Some((open, name_end + colon + 2));
                }
            }
        }
        from = open + 1;
    }
    None
}

/// Remove the first bolded label; prefix-only matches are left intact.
fn strip_label(segment: &str, label: &str) -> String {
    match find_bold_label(segment, label) {
        Some((start, end)) => {
            let mut out = String::with_capacity(segment.len());
            out.push_str(&segment[..start]);
            out.push_str(&segment[end..]);
            out
        }
        None => segment.to_owned(),
    }
}

/// Drop one leading `marker` (and the whitespace after it), then trim.
fn strip_leading_marker(text: &str, marker: char) -> String {
    let text = text.trim_start();
    let text = text
        .strip_prefix(marker)
        .map_or(text, str::trim_start);
    text.trim().to_owned()
}

/// First `(http:...)` or `(https:...)` link target in the segment.
fn first_http_link(segment: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(offset) = segment[from..].find('(') {
        let open = from + offset;
        let candidate = &segment[open + 1..];
        let scheme_len = if candidate.starts_with("https:") {
            Some(6)
        } else if candidate.starts_with("http:") {
            Some(5)
        } else {
            None
        };
        if let Some(scheme_len) = scheme_len {
            if let Some(close) = candidate.find(')') {
                if close > scheme_len {
                    return Some(&candidate[..close]);
                }
            }
        }
        from = open + 1;
    }
    None
}

/// Every non-empty line after the label line, bullet marker removed.
///
/// The label line is the one holding the bolded label; for the bare prefix
/// form it is the first line.
fn bullet_points(segment: &str, label: &str) -> Vec<String> {
    let label_end = find_bold_label(segment, label).map_or(0, |(_, end)| end);
    let Some((_, body)) = segment[label_end..].split_once('\n') else {
        return Vec::new();
    };
    body.split('\n')
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix(['-', '*'])
                .unwrap_or(line)
                .trim()
                .to_owned()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert!(classify("").is_empty());
        assert!(classify("  \n\n \t\n").is_empty());
    }

    #[test]
    fn splits_on_two_or_more_newlines_only() {
        let blocks = classify("line one\nline two\n\n\n\nnext paragraph\n\n");
        assert_eq!(
            blocks,
            vec![
                LessonBlock::Narrative {
                    markdown: "line one\nline two".into()
                },
                LessonBlock::Narrative {
                    markdown: "next paragraph".into()
                },
            ]
        );
    }

    #[test]
    fn interior_blank_segment_is_an_empty_narrative() {
        let blocks = classify("a\n\n  \n\nb");
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            LessonBlock::Narrative {
                markdown: "  ".into()
            }
        );
    }

    #[test]
    fn watch_takes_first_parenthesized_http_link() {
        let blocks = classify(
            "**Watch:** [intro](https://youtu.be/abc) and [more](http://example.com/x)",
        );
        assert_eq!(
            blocks,
            vec![LessonBlock::Watch {
                url: "https://youtu.be/abc".into()
            }]
        );
    }

    #[test]
    fn watch_skips_non_http_parentheses() {
        let blocks = classify("A (short) clip. **watch** (ftp://nope) (http://ok.test/v)");
        assert_eq!(
            blocks,
            vec![LessonBlock::Watch {
                url: "http://ok.test/v".into()
            }]
        );
    }

    #[test]
    fn watch_without_link_uses_placeholder() {
        let blocks = classify("**Watch** the recording later.");
        assert_eq!(
            blocks,
            vec![LessonBlock::Watch {
                url: WATCH_PLACEHOLDER_URL.into()
            }]
        );
    }

    #[test]
    fn try_it_strips_label_and_blockquote() {
        let blocks = classify("**Try it:**\n>   Run `nmap -sV` against the lab host.");
        assert_eq!(
            blocks,
            vec![LessonBlock::TryIt {
                body: "Run `nmap -sV` against the lab host.".into()
            }]
        );
    }

    #[test]
    fn quiz_strips_label_and_bullet() {
        let blocks = classify("**Quiz:**\n- Can hybrid detection catch unknown threats?");
        assert_eq!(
            blocks,
            vec![LessonBlock::Quiz {
                question: "Can hybrid detection catch unknown threats?".into()
            }]
        );
    }

    #[test]
    fn diagram_keeps_internal_newlines() {
        let blocks = classify("**Diagram:**\n[sensor] -> [engine]\n   |\n[alert]");
        assert_eq!(
            blocks,
            vec![LessonBlock::Diagram {
                body: "[sensor] -> [engine]\n   |\n[alert]".into()
            }]
        );
    }

    #[test]
    fn example_and_interactive_strip_label() {
        let blocks = classify("**Example:** A port scan.\n\n**Interactive:** Toggle the rule.");
        assert_eq!(
            blocks,
            vec![
                LessonBlock::Example {
                    body: "A port scan.".into()
                },
                LessonBlock::Interactive {
                    body: "Toggle the rule.".into()
                },
            ]
        );
    }

    #[test]
    fn key_points_and_best_practices_keep_order() {
        let text = "**Key Points:**\n- first\n* second\n\n   \n\n**Best Practices:**\n- tune\n\n";
        let blocks = classify(text);
        assert_eq!(
            blocks[0],
            LessonBlock::KeyPoints {
                points: vec!["first".into(), "second".into()]
            }
        );
        assert_eq!(
            blocks[2],
            LessonBlock::BestPractices {
                points: vec!["tune".into()]
            }
        );
    }

    #[test]
    fn key_points_skip_blank_lines() {
        let blocks = classify("**Key Points**\n- a\n\t\n- b\n-   c  ");
        assert_eq!(
            blocks,
            vec![LessonBlock::KeyPoints {
                points: vec!["a".into(), "b".into(), "c".into()]
            }]
        );
    }

    #[test]
    fn points_start_after_a_label_below_intro_text() {
        let blocks = classify("Recap of this lesson:\n**Key Points:**\n- fast\n- brittle");
        assert_eq!(
            blocks,
            vec![LessonBlock::KeyPoints {
                points: vec!["fast".into(), "brittle".into()]
            }]
        );

        let blocks = classify("Wrap-up\nmore intro\n**best practices**\n* review weekly");
        assert_eq!(blocks[0].points(), Some(&["review weekly".to_string()][..]));
    }

    #[test]
    fn label_without_following_lines_has_no_points() {
        assert_eq!(
            classify("Intro **Key Points**"),
            vec![LessonBlock::KeyPoints { points: vec![] }]
        );
    }

    #[test]
    fn label_match_is_case_insensitive_when_bolded() {
        let blocks = classify("Some context. **QUIZ:** - ready?");
        assert_eq!(
            blocks,
            vec![LessonBlock::Quiz {
                question: "Some context.  - ready?".into()
            }]
        );
    }

    #[test]
    fn prefix_form_is_detected_without_closing_bold() {
        let blocks = classify("**Example of a signature rule**\nalert tcp any any");
        assert_eq!(
            blocks,
            vec![LessonBlock::Example {
                body: "**Example of a signature rule**\nalert tcp any any".into()
            }]
        );
    }

    #[test]
    fn priority_order_prefers_watch_over_quiz() {
        let blocks = classify("**Quiz:** what did you see? **Watch:** (https://v.test/1)");
        assert_eq!(blocks[0].kind(), BlockKind::Watch);
    }

    #[test]
    fn plain_bold_text_is_narrative() {
        let text = "Signatures are **fast** but **brittle**.";
        assert_eq!(
            classify(text),
            vec![LessonBlock::Narrative {
                markdown: text.into()
            }]
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "# Title\n\n**Watch:** (https://a.test)\n\n**Key Points:**\n- x\n\nplain";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let blocks = classify("✅ **Best Practices** ✅\n- café\n\n**Ünïcode**");
        assert_eq!(blocks[0].kind(), BlockKind::BestPractices);
        assert_eq!(blocks[1].kind(), BlockKind::Narrative);
    }
}
