//! Search-result assembly: positional reconstruction of video entries
//! from a record's classified fragments.
//!
//! Fragment ordering is stable but not exact; a video's companions sit
//! near known relative positions. A complete video entry needs three
//! nodes, e.g.:
//!
//!   order 138  duration  "3:46"        ariala "3 minutes, 46 seconds"
//!   order 139  video     "/watch?v=Y88X2L6ms_E"
//!   order 142  author    "/channel/UCU4xqrR6oX1FTggJ8bVRWhQ"

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::models::{RawAcquisition, SearchResult};
use crate::parsers::classify::{classify_fragment, ClassifiedNode, Nature, NatureKind};
use crate::parsers::dissect::dissect_label;
use crate::parsers::locale::guess_language;

/// Offsets tried around the expected position, closest first. The ±2
/// window absorbs DOM noise from intervening unclassified elements.
const FUZZY_OFFSETS: [i64; 5] = [0, -1, 1, -2, 2];

/// Find a node of the wanted nature near `expected`, or None outside the
/// ±2 window. A node may satisfy more than one video; nothing claims it.
pub fn fuzzy_find(
    nodes: &[ClassifiedNode],
    kind: NatureKind,
    expected: i64,
) -> Option<&ClassifiedNode> {
    FUZZY_OFFSETS.iter().find_map(|offset| {
        nodes
            .iter()
            .find(|n| n.nature.kind() == kind && n.order == expected + offset)
    })
}

/// Extract the decoded search terms, but only for genuine search pages.
fn search_terms(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    if url.path() != "/results" {
        return None;
    }
    let decoded = urlencoding::decode(url.query().unwrap_or("")).ok()?;
    Some(decoded.replacen("search_query=", "", 1))
}

/// Pull the `v` query parameter out of a watch href (usually relative).
fn video_id(href: &str) -> Option<String> {
    let base = Url::parse("https://www.youtube.com/").ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| *k == "v")
        .map(|(_, v)| v.into_owned())
}

/// Derive the search-result records for one acquisition.
///
/// Returns an empty list for records that are not a search page, carry no
/// fragments, or whose fragments all fail classification. None of those
/// cases is an error.
pub fn process_acquisition(record: &RawAcquisition) -> Vec<SearchResult> {
    if record.acquired.is_empty() {
        debug!(id = %record.id, "record has an empty acquired list");
        return Vec::new();
    }
    let Some(terms) = search_terms(&record.href) else {
        return Vec::new();
    };

    let nodes: Vec<ClassifiedNode> = record
        .acquired
        .iter()
        .filter_map(classify_fragment)
        .collect();
    if nodes.is_empty() {
        return Vec::new();
    }

    // the trailing-word tally across every label drives the locale guess
    let mut tally: HashMap<&str, usize> = HashMap::new();
    for node in &nodes {
        if let Some(last) = node.ariala.split_whitespace().last() {
            *tally.entry(last).or_insert(0) += 1;
        }
    }
    let tokens: Vec<&str> = tally.keys().copied().collect();
    let ux = guess_language(&tokens);

    let videos: Vec<&ClassifiedNode> = nodes
        .iter()
        .filter(|n| n.nature.kind() == NatureKind::Video)
        .collect();

    let mut out = Vec::with_capacity(videos.len());
    for (priority_order, video) in videos.iter().enumerate() {
        let Nature::Video { title, href } = &video.nature else {
            continue;
        };

        let duration = fuzzy_find(&nodes, NatureKind::Duration, video.order - 1);
        let channel = fuzzy_find(&nodes, NatureKind::Author, video.order + 3);

        let mut result = SearchResult {
            id: SearchResult::compute_id(
                &record.metadata_id,
                &terms,
                &record.public_key,
                priority_order,
            ),
            metadata_id: record.metadata_id.clone(),
            public_key: record.public_key.clone(),
            clang: ux.locale.clone(),
            saving_time: record.saving_time,
            video_id: video_id(href).unwrap_or_default(),
            title: title.clone(),
            priority_order,
            search_terms: terms.clone(),
            selected_author: None,
            display_length: None,
            relative_seconds: None,
            current_views: None,
            selected_channel: None,
            incomplete: None,
        };

        if let Some(duration_node) = duration {
            if let Nature::Duration { display_length } = &duration_node.nature {
                let dissection =
                    dissect_label(&video.ariala, title, &duration_node.ariala, &ux);
                result.selected_author =
                    Some(dissection.author_name).filter(|s| !s.is_empty());
                result.display_length =
                    Some(display_length.clone()).filter(|s| !s.is_empty());
                if let Some(mined) = dissection.mined {
                    result.relative_seconds = Some(mined.relative_seconds).filter(|&v| v != 0);
                    result.current_views = Some(mined.views).filter(|&v| v != 0);
                }
            }
        }

        // quality double-check: all four enrichment fields or the flag
        if result.selected_author.is_none()
            || result.display_length.is_none()
            || result.relative_seconds.is_none()
            || result.current_views.is_none()
        {
            result.incomplete = Some(true);
        }

        if let Some(channel_node) = channel {
            if let Nature::Author { href } = &channel_node.nature {
                result.selected_channel = Some(href.clone());
            }
        }

        out.push(result);
    }

    debug!(
        id = %record.id,
        acquired = record.acquired.len(),
        videos = out.len(),
        "assembled record"
    );
    out
}
