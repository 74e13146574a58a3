//! Selector policy table
//!
//! Every field owns an ordered list of strategies, newest markup first.
//! Supporting another markup generation means adding a row here; the
//! extractors themselves never change.
//!
//! A strategy is one CSS selector group. Members of a group are unioned;
//! separate strategies are tried in order and the first one that matches
//! wins, without merging results across strategies.

use crate::extract::RenderedDocument;
use scraper::ElementRef;

/// Ordered fallback strategies for one field
#[derive(Debug, Clone, Copy)]
pub struct SelectorChain {
    /// Field name used in trace output
    pub field: &'static str,

    /// CSS selector groups in priority order
    pub strategies: &'static [&'static str],
}

impl SelectorChain {
    /// First element matched by the highest-priority strategy that matches
    pub fn first_match<'a>(&self, document: &'a RenderedDocument) -> Option<ElementRef<'a>> {
        self.strategies.iter().enumerate().find_map(|(rank, strategy)| {
            let found = document.select_first(strategy);
            if found.is_some() {
                tracing::trace!("{}: matched strategy #{} ({})", self.field, rank, strategy);
            }
            found
        })
    }

    /// All elements matched by the highest-priority strategy that matches
    pub fn all_matches<'a>(&self, document: &'a RenderedDocument) -> Vec<ElementRef<'a>> {
        for (rank, strategy) in self.strategies.iter().enumerate() {
            let found = document.select_all(strategy);
            if !found.is_empty() {
                tracing::trace!(
                    "{}: strategy #{} ({}) matched {} nodes",
                    self.field,
                    rank,
                    strategy,
                    found.len()
                );
                return found;
            }
        }
        Vec::new()
    }
}

/// Post body container: current editor first, then legacy editors
pub const BODY: SelectorChain = SelectorChain {
    field: "body",
    strategies: &[
        "div.se-main-container",
        "#viewTypeSelector, .post-view, .se_component_wrap",
    ],
};

/// Publish date, any of the date-bearing nodes used across eras
pub const PUBLISH_DATE: SelectorChain = SelectorChain {
    field: "publish_date",
    strategies: &[".blog_date, .se_publishDate, .date, .se_date, .date_time, .writer_info .date"],
};

/// Tag links, current tag bar first
pub const HASHTAGS: SelectorChain = SelectorChain {
    field: "hashtags",
    strategies: &[".tag_wrap a", ".post_tag_wrap a, .tag__tFC3j"],
};

/// Sticker images, including a misspelled class that shipped in older posts
pub const STICKERS: SelectorChain = SelectorChain {
    field: "stickers",
    strategies: &["img.se-sticker-image, img.se-sticker-imgae, .se-sticker-image"],
};

/// Map embeds
pub const MAPS: SelectorChain = SelectorChain {
    field: "maps",
    strategies: &["a.se-map-info, .se-module-map"],
};

/// Post images, recognised by their id prefix
pub const IMAGES: SelectorChain = SelectorChain {
    field: "images",
    strategies: &[r#"img[id^="img_"]"#],
};

/// Like counter widgets; a page may render several copies
pub const LIKES: SelectorChain = SelectorChain {
    field: "likes",
    strategies: &[".like_count, .btn_like .num, .u_cnt._count"],
};

/// Comment counter: a label node followed by a sibling holding the number
#[derive(Debug, Clone, Copy)]
pub struct LabelledCounter {
    /// Where to look for the label
    pub labels: SelectorChain,

    /// Text the label must contain
    pub label_text: &'static str,

    /// Tag name of the sibling that carries the count
    pub count_tag: &'static str,
}

pub const COMMENTS: LabelledCounter = LabelledCounter {
    labels: SelectorChain {
        field: "comments",
        strategies: &["span.sp.ico"],
    },
    label_text: "댓글",
    count_tag: "em",
};

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: SelectorChain = SelectorChain {
        field: "test",
        strategies: &[".new", ".old, .older"],
    };

    #[test]
    fn test_first_strategy_wins() {
        let doc = RenderedDocument::parse(r#"<p class="old">o</p><p class="new">n</p>"#);
        let found = CHAIN.first_match(&doc).unwrap();
        assert_eq!(found.value().attr("class"), Some("new"));
    }

    #[test]
    fn test_falls_back_in_order() {
        let doc = RenderedDocument::parse(r#"<p class="older">x</p>"#);
        assert!(CHAIN.first_match(&doc).is_some());
    }

    #[test]
    fn test_no_merge_across_strategies() {
        let doc = RenderedDocument::parse(
            r#"<p class="new">1</p><p class="old">2</p><p class="older">3</p>"#,
        );
        assert_eq!(CHAIN.all_matches(&doc).len(), 1);
    }

    #[test]
    fn test_union_within_strategy() {
        let doc = RenderedDocument::parse(r#"<p class="old">2</p><p class="older">3</p>"#);
        assert_eq!(CHAIN.all_matches(&doc).len(), 2);
    }

    #[test]
    fn test_every_selector_parses() {
        let chains = [BODY, PUBLISH_DATE, HASHTAGS, STICKERS, MAPS, IMAGES, LIKES, COMMENTS.labels];
        for chain in chains {
            for strategy in chain.strategies {
                assert!(
                    scraper::Selector::parse(strategy).is_ok(),
                    "{} selector does not parse: {}",
                    chain.field,
                    strategy
                );
            }
        }
    }
}
