//! Slug-keyed merge of two post lists.
//!
//! Posts are identified by slug. The merge seeds an insertion-ordered map
//! with the primary list, lets every override post replace (or add) its slug,
//! then sorts by date, newest first. The sort is stable, so posts with equal
//! or unparseable dates keep their map order.
//!
//! ```text
//! primary:  [a(static), b(static), c(static)]
//! override: [b(cms), d(cms)]
//! result:   {a, b(cms), c, d} sorted by date desc
//! ```

use crate::bundled::StaticStore;
use crate::types::{Post, Provenance, sort_newest_first};
use indexmap::IndexMap;

/// Union by slug; `overrides` win, and a later override beats an earlier one.
pub fn merge<I, J>(primary: I, overrides: J) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
    J: IntoIterator<Item = Post>,
{
    let mut by_slug: IndexMap<String, Post> = IndexMap::new();
    for post in primary.into_iter().chain(overrides) {
        by_slug.insert(post.slug.clone(), post);
    }
    let mut merged: Vec<Post> = by_slug.into_values().collect();
    sort_newest_first(&mut merged);
    merged
}

/// Bundled posts (tagged `static`) overlaid with client posts.
pub fn merge_with_static(store: &StaticStore, posts: Vec<Post>) -> Vec<Post> {
    let statics = store
        .posts()
        .iter()
        .cloned()
        .map(|p| p.with_provenance(Provenance::Static));
    merge(statics, posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::post;

    fn slugs(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn override_wins_on_shared_slug() {
        let primary = vec![post("a", "2025-01-01", Provenance::Static)];
        let overrides = vec![post("a", "2025-01-01", Provenance::Cms)];
        let merged = merge(primary, overrides);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].provenance, Provenance::Cms);
    }

    #[test]
    fn union_sorted_newest_first() {
        let primary = vec![
            post("old", "2024-06-01", Provenance::Static),
            post("mid", "2024-09-01", Provenance::Static),
        ];
        let overrides = vec![post("new", "2025-01-01T10:00:00Z", Provenance::Cms)];
        assert_eq!(slugs(&merge(primary, overrides)), ["new", "mid", "old"]);
    }

    #[test]
    fn later_override_beats_earlier() {
        let mut first = post("a", "2025-01-01", Provenance::Cms);
        first.title = "first".into();
        let mut second = post("a", "2025-01-01", Provenance::Cms);
        second.title = "second".into();
        let merged = merge(Vec::new(), vec![first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "second");
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let primary = vec![
            post("x", "2025-01-01", Provenance::Static),
            post("y", "2025-01-01", Provenance::Static),
        ];
        let overrides = vec![post("z", "2025-01-01", Provenance::Cms)];
        assert_eq!(slugs(&merge(primary, overrides)), ["x", "y", "z"]);
    }

    #[test]
    fn replaced_post_keeps_its_first_position() {
        let primary = vec![
            post("x", "2025-01-01", Provenance::Static),
            post("y", "2025-01-01", Provenance::Static),
        ];
        let overrides = vec![post("x", "2025-01-01", Provenance::Cms)];
        let merged = merge(primary, overrides);
        assert_eq!(slugs(&merged), ["x", "y"]);
        assert_eq!(merged[0].provenance, Provenance::Cms);
    }

    #[test]
    fn merge_is_idempotent() {
        let a = vec![
            post("a", "2024-01-01", Provenance::Static),
            post("b", "2024-02-01", Provenance::Static),
        ];
        let b = vec![
            post("b", "2024-02-01", Provenance::Cms),
            post("c", "2024-03-01", Provenance::Cms),
        ];
        let once = merge(a, b.clone());
        let twice = merge(once.clone(), b);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_inputs() {
        assert!(merge(Vec::new(), Vec::new()).is_empty());
        let only = merge(vec![post("a", "2025-01-01", Provenance::Static)], Vec::new());
        assert_eq!(slugs(&only), ["a"]);
    }

    #[test]
    fn merge_with_static_cms_overrides_bundled() {
        let store = StaticStore::bundled();
        let bundled = &store.posts()[0];
        let mut cms = bundled.clone().with_provenance(Provenance::Cms);
        cms.title = "Updated in CMS".into();

        let merged = merge_with_static(&store, vec![cms]);
        assert_eq!(merged.len(), store.len());
        let found = merged.iter().find(|p| p.slug == bundled.slug).unwrap();
        assert_eq!(found.title, "Updated in CMS");
        assert_eq!(found.provenance, Provenance::Cms);
        assert!(
            merged
                .iter()
                .filter(|p| p.slug != bundled.slug)
                .all(|p| p.provenance == Provenance::Static)
        );
    }

    #[test]
    fn merge_with_static_adds_new_posts() {
        let store = StaticStore::bundled();
        let fresh = post("brand-new", "2030-01-01", Provenance::Cms);
        let merged = merge_with_static(&store, vec![fresh]);
        assert_eq!(merged.len(), store.len() + 1);
        assert_eq!(merged[0].slug, "brand-new");
    }
}
