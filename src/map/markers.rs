use std::collections::HashSet;

use tracing::debug;

use crate::issues::{Issue, IssueId};

use super::geo::LatLng;
use super::palette::{CategoryPalette, Rgb};
use super::surface::MapSurface;

/// Marker icon diameter in display units (anchored at its center)
pub const ICON_SIZE: f64 = 15.0;

/// Content of a marker's info popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupInfo {
    pub title: String,
    pub location: String,
    pub status: String,
    pub image_url: Option<String>,
}

/// One issue as drawn on the map
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub id: IssueId,
    pub position: LatLng,
    pub color: Rgb,
    pub category: String,
    pub popup: PopupInfo,
}

/// What a marker sync changed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MarkerDiff {
    pub added: Vec<IssueId>,
    pub updated: Vec<IssueId>,
    pub removed: Vec<IssueId>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Build one marker per mappable issue, first occurrence winning on duplicate ids
pub fn present(issues: &[&Issue], palette: &CategoryPalette) -> Vec<MarkerDescriptor> {
    let mut seen = HashSet::new();

    issues
        .iter()
        .filter_map(|issue| {
            let position = issue.position()?;
            if !seen.insert(&issue.id) {
                return None;
            }

            Some(MarkerDescriptor {
                id: issue.id.clone(),
                position,
                color: palette.color_for(&issue.category),
                category: issue.category.clone(),
                popup: PopupInfo {
                    title: issue.title.clone(),
                    location: issue.location.clone(),
                    status: issue.status.clone(),
                    image_url: issue.image_url.clone(),
                },
            })
        })
        .collect()
}

/// Make the surface's marker set match `markers` exactly
pub fn sync_markers(surface: &mut dyn MapSurface, markers: Vec<MarkerDescriptor>) -> MarkerDiff {
    let mut diff = MarkerDiff::default();
    let wanted: HashSet<IssueId> = markers.iter().map(|m| m.id.clone()).collect();

    for id in surface.marker_ids() {
        if !wanted.contains(&id) {
            surface.remove_marker(&id);
            diff.removed.push(id);
        }
    }

    for marker in markers {
        let unchanged = surface.marker(&marker.id).map(|existing| *existing == marker);
        match unchanged {
            None => {
                diff.added.push(marker.id.clone());
                surface.upsert_marker(marker);
            }
            Some(false) => {
                diff.updated.push(marker.id.clone());
                surface.upsert_marker(marker);
            }
            Some(true) => {}
        }
    }

    if !diff.is_empty() {
        debug!(
            added = diff.added.len(),
            updated = diff.updated.len(),
            removed = diff.removed.len(),
            "Synced markers"
        );
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{mappable, test_issue};
    use crate::map::geo::Size;
    use crate::map::palette::FALLBACK_COLOR;
    use crate::map::surface::RecordingSurface;

    #[test]
    fn test_present_colors_by_category() {
        let palette = CategoryPalette::default();
        let issues = vec![
            test_issue("1", Some(12.97), Some(77.59), "garbage"),
            test_issue("2", Some(12.95), Some(77.61), "pothole"),
        ];
        let refs: Vec<&Issue> = issues.iter().collect();

        let markers = present(&refs, &palette);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].color, palette.color_for("garbage"));
        assert_eq!(markers[1].color, FALLBACK_COLOR);
        assert_eq!(markers[0].popup.title, "Issue 1");
        assert_eq!(markers[0].position, LatLng::new(12.97, 77.59));
    }

    #[test]
    fn test_present_skips_duplicates_and_invalid() {
        let palette = CategoryPalette::default();
        let mut second = test_issue("1", Some(13.0), Some(77.0), "road");
        second.title = String::from("Duplicate");
        let issues = vec![
            test_issue("1", Some(12.97), Some(77.59), "garbage"),
            second,
            test_issue("2", None, Some(77.6), "road"),
        ];
        let refs: Vec<&Issue> = issues.iter().collect();

        let markers = present(&refs, &palette);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].popup.title, "Issue 1");
    }

    #[test]
    fn test_sync_reconciles_by_id() {
        let palette = CategoryPalette::default();
        let mut surface = RecordingSurface::new(Size::new(640.0, 384.0));

        let issues = vec![
            test_issue("1", Some(12.97), Some(77.59), "garbage"),
            test_issue("2", Some(12.95), Some(77.61), "water"),
        ];
        let diff = sync_markers(&mut surface, present(&mappable(&issues), &palette));
        assert_eq!(diff.added.len(), 2);
        assert_eq!(surface.markers.len(), 2);

        // Same content again: nothing re-placed
        let diff = sync_markers(&mut surface, present(&mappable(&issues), &palette));
        assert!(diff.is_empty());
        assert_eq!(surface.upserts, 2);

        // Issue 1 changes status, issue 2 disappears, issue 3 arrives
        let mut changed = test_issue("1", Some(12.97), Some(77.59), "garbage");
        changed.status = String::from("resolved");
        let issues = vec![changed, test_issue("3", Some(12.90), Some(77.50), "road")];

        let diff = sync_markers(&mut surface, present(&mappable(&issues), &palette));
        assert_eq!(diff.added, vec![IssueId::from("3")]);
        assert_eq!(diff.updated, vec![IssueId::from("1")]);
        assert_eq!(diff.removed, vec![IssueId::from("2")]);

        let ids: Vec<&str> = surface.markers.keys().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(surface.markers[&IssueId::from("1")].popup.status, "resolved");
    }

    #[test]
    fn test_sync_empty_clears_surface() {
        let palette = CategoryPalette::default();
        let mut surface = RecordingSurface::new(Size::new(640.0, 384.0));
        let issues = vec![test_issue("1", Some(12.97), Some(77.59), "garbage")];
        sync_markers(&mut surface, present(&mappable(&issues), &palette));

        let diff = sync_markers(&mut surface, Vec::new());
        assert_eq!(diff.removed.len(), 1);
        assert!(surface.markers.is_empty());
    }
}
