//! Field extractors
//!
//! Eight independent, stateless functions, one per metadata field. Each one
//! reads a [`RenderedDocument`] through its [`selectors`] chain and reports a
//! [`FieldResult`]; none of them can fail.
//!
//! Node-count fields (hashtags, stickers, maps, images) always report
//! `Found`, with zero when nothing matched. Counter widgets that have to be
//! read (comments, likes) report `Absent` when the widget is missing or
//! carries no digits.

use crate::extract::document::{element_text, visible_text};
use crate::extract::selectors::{self, LabelledCounter};
use crate::extract::{FieldResult, RenderedDocument};
use scraper::ElementRef;

/// Hashtag entries read from the tag bar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hashtags {
    /// Entries rendered with a leading `#`
    pub visible: Vec<String>,

    /// Value of the collapsed `+N` entry, if the bar was truncated
    pub additional: u64,
}

impl Hashtags {
    /// Visible tags plus the collapsed remainder
    pub fn total(&self) -> u64 {
        self.visible.len() as u64 + self.additional
    }
}

/// Extracts the post body as visible text, one line per paragraph
///
/// An empty container is treated the same as a missing one.
pub fn extract_body(document: &RenderedDocument) -> FieldResult<String> {
    selectors::BODY
        .first_match(document)
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .into()
}

/// Extracts the raw publish date text
///
/// No date parsing is attempted; the format differs between post eras.
pub fn extract_publish_date(document: &RenderedDocument) -> FieldResult<String> {
    selectors::PUBLISH_DATE
        .first_match(document)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .into()
}

/// Extracts the hashtag bar
pub fn extract_hashtags(document: &RenderedDocument) -> FieldResult<Hashtags> {
    let entries: Vec<String> = selectors::HASHTAGS
        .all_matches(document)
        .into_iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    FieldResult::Found(count_hashtags(&entries))
}

/// Splits tag-bar entries into visible tags and the collapsed remainder
///
/// Only the first entry of the form `+<digits>` is honoured; entries that
/// start with `+` but do not parse are skipped.
pub fn count_hashtags<S: AsRef<str>>(entries: &[S]) -> Hashtags {
    let visible = entries
        .iter()
        .map(|entry| entry.as_ref().trim())
        .filter(|entry| entry.starts_with('#'))
        .map(str::to_string)
        .collect();

    let additional = entries
        .iter()
        .find_map(|entry| parse_more_indicator(entry.as_ref()))
        .unwrap_or(0);

    Hashtags {
        visible,
        additional,
    }
}

fn parse_more_indicator(entry: &str) -> Option<u64> {
    let digits = entry.trim().strip_prefix('+')?.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Counts sticker images
pub fn extract_sticker_count(document: &RenderedDocument) -> FieldResult<u64> {
    FieldResult::Found(selectors::STICKERS.all_matches(document).len() as u64)
}

/// Counts map embeds
pub fn extract_map_count(document: &RenderedDocument) -> FieldResult<u64> {
    FieldResult::Found(selectors::MAPS.all_matches(document).len() as u64)
}

/// Counts post images
pub fn extract_image_count(document: &RenderedDocument) -> FieldResult<u64> {
    FieldResult::Found(selectors::IMAGES.all_matches(document).len() as u64)
}

/// Reads the comment counter next to the comment label
pub fn extract_comment_count(document: &RenderedDocument) -> FieldResult<u64> {
    read_labelled_counter(document, &selectors::COMMENTS).into()
}

fn read_labelled_counter(document: &RenderedDocument, counter: &LabelledCounter) -> Option<u64> {
    let label = counter
        .labels
        .all_matches(document)
        .into_iter()
        .find(|label| element_text(*label).contains(counter.label_text))?;

    let count_node = following_sibling(label, counter.count_tag)?;
    parse_digits(&element_text(count_node))
}

/// First following sibling element with the given tag name
fn following_sibling<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == tag)
}

/// Reads the like counter, taking the largest value among duplicate widgets
pub fn extract_like_count(document: &RenderedDocument) -> FieldResult<u64> {
    let candidates: Vec<String> = selectors::LIKES
        .all_matches(document)
        .into_iter()
        .map(element_text)
        .collect();

    max_parsed(&candidates).into()
}

/// Maximum digit-parsed value among candidate texts
///
/// Candidates without digits are skipped.
pub fn max_parsed<S: AsRef<str>>(candidates: &[S]) -> Option<u64> {
    candidates
        .iter()
        .filter_map(|candidate| parse_digits(candidate.as_ref()))
        .max()
}

/// Keeps only ASCII digits and parses them
///
/// Returns `None` when no digit is present or the value overflows.
///
/// # Examples
///
/// ```
/// use blog_harvest::extract::fields::parse_digits;
///
/// assert_eq!(parse_digits("42개"), Some(42));
/// assert_eq!(parse_digits("1,024"), Some(1024));
/// assert_eq!(parse_digits("공감"), None);
/// ```
pub fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> RenderedDocument {
        RenderedDocument::parse(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_body_from_current_editor() {
        let d = doc(r#"<div class="se-main-container"><p>Hello</p><p>World</p></div>
                      <div class="post-view">legacy</div>"#);
        assert_eq!(extract_body(&d), FieldResult::Found("Hello\nWorld".to_string()));
    }

    #[test]
    fn test_body_keeps_styled_text_in_its_paragraph() {
        let d = doc(r#"<div class="se-main-container"><p>Hello <b>bold</b> world</p><p>Next</p></div>"#);
        assert_eq!(
            extract_body(&d),
            FieldResult::Found("Hello bold world\nNext".to_string())
        );
    }

    #[test]
    fn test_body_falls_back_to_legacy_container() {
        let d = doc(r#"<div id="viewTypeSelector"><p> Old post </p></div>"#);
        assert_eq!(extract_body(&d), FieldResult::Found("Old post".to_string()));
    }

    #[test]
    fn test_body_falls_back_to_component_wrap() {
        let d = doc(r#"<div class="se_component_wrap">wrapped</div>"#);
        assert_eq!(extract_body(&d), FieldResult::Found("wrapped".to_string()));
    }

    #[test]
    fn test_body_absent() {
        let d = doc("<div class='something-else'>text</div>");
        assert_eq!(extract_body(&d), FieldResult::Absent);
    }

    #[test]
    fn test_publish_date_any_selector() {
        let d = doc(r#"<div class="writer_info"><span class="date"> 2024. 3. 1. 14:02 </span></div>"#);
        assert_eq!(
            extract_publish_date(&d),
            FieldResult::Found("2024. 3. 1. 14:02".to_string())
        );

        let d = doc(r#"<p class="se_publishDate">2015.06.01</p>"#);
        assert_eq!(
            extract_publish_date(&d),
            FieldResult::Found("2015.06.01".to_string())
        );
    }

    #[test]
    fn test_publish_date_absent() {
        assert_eq!(extract_publish_date(&doc("<p>none</p>")), FieldResult::Absent);
    }

    #[test]
    fn test_count_hashtags_with_more_indicator() {
        let tags = count_hashtags(&["#food", "#seoul", "+3"]);
        assert_eq!(tags.visible, vec!["#food", "#seoul"]);
        assert_eq!(tags.additional, 3);
        assert_eq!(tags.total(), 5);
    }

    #[test]
    fn test_count_hashtags_only_first_indicator() {
        let tags = count_hashtags(&["#a", "+x", "+2", "+9"]);
        assert_eq!(tags.total(), 3);
    }

    #[test]
    fn test_count_hashtags_ignores_plain_entries() {
        let tags = count_hashtags(&["more", "#a"]);
        assert_eq!(tags.total(), 1);
    }

    #[test]
    fn test_hashtags_primary_bar() {
        let d = doc(r##"<div class="tag_wrap"><a>#cafe</a><a>#latte</a><a> </a><a>+4</a></div>
                       <div class="post_tag_wrap"><a>#ignored</a></div>"##);
        let tags = extract_hashtags(&d).unwrap_or_default();
        assert_eq!(tags.visible, vec!["#cafe", "#latte"]);
        assert_eq!(tags.total(), 6);
    }

    #[test]
    fn test_hashtags_fallback_bar() {
        let d = doc(r##"<div class="post_tag_wrap"><a>#old</a></div><span class="tag__tFC3j">#new</span>"##);
        assert_eq!(extract_hashtags(&d).unwrap_or_default().total(), 2);
    }

    #[test]
    fn test_hashtags_none_is_zero() {
        assert_eq!(
            extract_hashtags(&doc("<p>x</p>")),
            FieldResult::Found(Hashtags::default())
        );
    }

    #[test]
    fn test_sticker_count_unions_selectors() {
        let d = doc(r#"<img class="se-sticker-image"><img class="se-sticker-imgae">
                       <span class="se-sticker-image"></span>"#);
        assert_eq!(extract_sticker_count(&d), FieldResult::Found(3));
    }

    #[test]
    fn test_map_count() {
        let d = doc(r#"<a class="se-map-info"></a><div class="se-module-map"></div>"#);
        assert_eq!(extract_map_count(&d), FieldResult::Found(2));
    }

    #[test]
    fn test_image_count_by_id_prefix() {
        let d = doc(r#"<img id="img_1"><img id="img_2"><img id="banner"><img>"#);
        assert_eq!(extract_image_count(&d), FieldResult::Found(2));
    }

    #[test]
    fn test_counts_zero_when_missing() {
        let d = doc("<p>plain</p>");
        assert_eq!(extract_sticker_count(&d), FieldResult::Found(0));
        assert_eq!(extract_map_count(&d), FieldResult::Found(0));
        assert_eq!(extract_image_count(&d), FieldResult::Found(0));
    }

    #[test]
    fn test_comment_count_from_sibling() {
        let d = doc(r#"<a><span class="sp ico">댓글</span><em>42개</em></a>"#);
        assert_eq!(extract_comment_count(&d), FieldResult::Found(42));
    }

    #[test]
    fn test_comment_count_picks_comment_label() {
        let d = doc(r#"<a><span class="sp ico">공감</span><em>7</em></a>
                       <a><span class="sp ico">댓글 수</span><em>12</em></a>"#);
        assert_eq!(extract_comment_count(&d), FieldResult::Found(12));
    }

    #[test]
    fn test_comment_count_label_missing() {
        let d = doc("<em>42</em>");
        assert_eq!(extract_comment_count(&d).unwrap_or_default(), 0);
    }

    #[test]
    fn test_comment_count_sibling_missing_or_empty() {
        let d = doc(r#"<a><span class="sp ico">댓글</span></a>"#);
        assert_eq!(extract_comment_count(&d).unwrap_or_default(), 0);

        let d = doc(r#"<a><span class="sp ico">댓글</span><em>없음</em></a>"#);
        assert_eq!(extract_comment_count(&d).unwrap_or_default(), 0);
    }

    #[test]
    fn test_max_parsed_skips_non_numeric() {
        assert_eq!(max_parsed(&["", "12", "99"]), Some(99));
        assert_eq!(max_parsed(&["공감", "0", "3"]), Some(3));
        assert_eq!(max_parsed::<&str>(&[]), None);
    }

    #[test]
    fn test_like_count_takes_maximum() {
        let d = doc(r#"<span class="u_cnt _count">0</span>
                       <div class="btn_like"><span class="num">1,205</span></div>
                       <em class="like_count">공감</em>"#);
        assert_eq!(extract_like_count(&d), FieldResult::Found(1205));
    }

    #[test]
    fn test_like_count_absent() {
        assert_eq!(extract_like_count(&doc("<p>x</p>")), FieldResult::Absent);
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("42개"), Some(42));
        assert_eq!(parse_digits(" 1 2 "), Some(12));
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("99999999999999999999999"), None);
    }
}
