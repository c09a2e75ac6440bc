//! Preview pagination engine.
//!
//! Partitions a continuously re-rendered preview surface into fixed-height
//! pages. The surface is anything that can report its rendered content
//! height and the viewer's scroll offset (`LayoutSurface`); the engine is
//! driven by observer callbacks — content edits and template switches call
//! `invalidate`, layout passes call `measure` — never by polling.
//!
//! An unmounted or zero-height surface is "not yet measured": the engine
//! reports a single page with no markers and retries on the next layout
//! pass. It never errors.

/// A4 at 96 dpi.
pub const A4_PAGE_HEIGHT_PX: f32 = 1122.5;

#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Fixed page height in the surface's pixel space.
    pub page_height: f32,
}

pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_height: A4_PAGE_HEIGHT_PX,
    }
}

/// A computed page break: `offset` pixels from the top of the surface, where
/// the page labelled `page_number` begins. Derived per measurement, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMarker {
    pub offset: f32,
    pub page_number: u32,
}

/// The rendered preview as the engine sees it. Implemented over whatever
/// layout primitive the host platform offers (resize/mutation observers, or
/// a periodic fallback).
pub trait LayoutSurface {
    /// Total rendered content height, or `None` while not yet mounted.
    fn content_height(&self) -> Option<f32>;

    /// Scroll offset of the visible viewport from the top of the content.
    fn viewport_offset(&self) -> f32;
}

#[derive(Debug)]
pub struct PaginationEngine {
    config: PageConfig,
    measured_height: Option<f32>,
    viewport_offset: f32,
    markers: Vec<PageMarker>,
    page_count: u32,
    current_page: u32,
    needs_measure: bool,
    recomputing: bool,
}

impl PaginationEngine {
    pub fn new(config: PageConfig) -> Self {
        let mut engine = Self {
            config,
            measured_height: None,
            viewport_offset: 0.0,
            markers: Vec::new(),
            page_count: 1,
            current_page: 1,
            needs_measure: true,
            recomputing: false,
        };
        engine.recompute();
        engine
    }

    /// Marks the layout stale (content edit, template switch, resize). The
    /// next `measure` call recomputes.
    pub fn invalidate(&mut self) {
        self.needs_measure = true;
    }

    pub fn needs_measure(&self) -> bool {
        self.needs_measure
    }

    /// Observer callback: reads the surface geometry and recomputes markers,
    /// page count and current page.
    pub fn measure(&mut self, surface: &dyn LayoutSurface) {
        self.measured_height = surface.content_height().filter(|h| *h > 0.0);
        self.viewport_offset = surface.viewport_offset();
        self.recompute();
    }

    /// Scroll tracking between measurements; re-derives the current page
    /// from the viewport offset without remeasuring content.
    pub fn track_scroll(&mut self, viewport_offset: f32) {
        self.viewport_offset = viewport_offset;
        self.current_page = self.page_for_offset(viewport_offset);
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn markers(&self) -> &[PageMarker] {
        &self.markers
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Navigates to a page, clamped to `[1, page_count]`; a boundary call is
    /// a no-op. Returns the scroll offset of the target page's top edge.
    pub fn go_to(&mut self, page: i64) -> f32 {
        let clamped = page.clamp(1, self.page_count as i64) as u32;
        self.current_page = clamped;
        (clamped - 1) as f32 * self.config.page_height
    }

    pub fn next(&mut self) -> f32 {
        self.go_to(self.current_page as i64 + 1)
    }

    pub fn prev(&mut self) -> f32 {
        self.go_to(self.current_page as i64 - 1)
    }

    fn page_for_offset(&self, offset: f32) -> u32 {
        let raw = (offset / self.config.page_height).floor() as i64 + 1;
        raw.clamp(1, self.page_count as i64) as u32
    }

    fn recompute(&mut self) {
        // observer callbacks must not recurse into an in-progress recompute
        if self.recomputing {
            self.needs_measure = true;
            return;
        }
        self.recomputing = true;

        match self.measured_height {
            Some(height) => {
                let pages = (height / self.config.page_height).ceil() as u32;
                self.page_count = pages.max(1);
                self.needs_measure = false;
            }
            None => {
                // not yet measured: report one page, retry next layout pass
                self.page_count = 1;
                self.needs_measure = true;
            }
        }

        self.markers = (1..self.page_count)
            .map(|i| PageMarker {
                offset: i as f32 * self.config.page_height,
                page_number: i + 1,
            })
            .collect();

        // shrinking content clamps the current page downward
        self.current_page = self.page_for_offset(self.viewport_offset);

        self.recomputing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSurface {
        height: Option<f32>,
        offset: f32,
    }

    impl LayoutSurface for FixedSurface {
        fn content_height(&self) -> Option<f32> {
            self.height
        }
        fn viewport_offset(&self) -> f32 {
            self.offset
        }
    }

    fn engine(page_height: f32) -> PaginationEngine {
        PaginationEngine::new(PageConfig { page_height })
    }

    #[test]
    fn test_page_count_is_ceil_of_height_over_page_height() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(1000.0),
            offset: 0.0,
        });
        assert_eq!(e.page_count(), 3);
        assert_eq!(
            e.markers(),
            &[
                PageMarker {
                    offset: 400.0,
                    page_number: 2
                },
                PageMarker {
                    offset: 800.0,
                    page_number: 3
                },
            ]
        );
    }

    #[test]
    fn test_short_content_is_one_page_no_markers() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(250.0),
            offset: 0.0,
        });
        assert_eq!(e.page_count(), 1);
        assert!(e.markers().is_empty());
    }

    #[test]
    fn test_unmeasured_surface_reports_one_page_and_retries() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: None,
            offset: 0.0,
        });
        assert_eq!(e.page_count(), 1);
        assert!(e.needs_measure());

        // surface mounts on a later layout pass
        e.measure(&FixedSurface {
            height: Some(900.0),
            offset: 0.0,
        });
        assert_eq!(e.page_count(), 3);
        assert!(!e.needs_measure());
    }

    #[test]
    fn test_zero_height_counts_as_unmeasured() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(0.0),
            offset: 0.0,
        });
        assert_eq!(e.page_count(), 1);
        assert!(e.needs_measure());
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_page() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(800.0),
            offset: 0.0,
        });
        assert_eq!(e.page_count(), 2);
    }

    #[test]
    fn test_current_page_follows_viewport_offset() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(1600.0),
            offset: 0.0,
        });
        assert_eq!(e.current_page(), 1);
        e.track_scroll(399.0);
        assert_eq!(e.current_page(), 1);
        e.track_scroll(400.0);
        assert_eq!(e.current_page(), 2);
        e.track_scroll(1500.0);
        assert_eq!(e.current_page(), 4);
    }

    #[test]
    fn test_shrinking_content_clamps_current_page_down() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(1600.0),
            offset: 1500.0,
        });
        assert_eq!(e.current_page(), 4);

        // content shrinks below the current page's offset
        e.measure(&FixedSurface {
            height: Some(700.0),
            offset: 1500.0,
        });
        assert_eq!(e.page_count(), 2);
        assert_eq!(e.current_page(), 2);
    }

    #[test]
    fn test_go_to_clamps_out_of_range_targets() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(1000.0),
            offset: 0.0,
        });
        assert_eq!(e.go_to(-5), 0.0);
        assert_eq!(e.current_page(), 1);
        assert_eq!(e.go_to(999), 800.0);
        assert_eq!(e.current_page(), 3);
    }

    #[test]
    fn test_next_and_prev_are_noops_at_boundaries() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(1000.0),
            offset: 0.0,
        });
        assert_eq!(e.prev(), 0.0);
        assert_eq!(e.current_page(), 1);

        e.go_to(3);
        assert_eq!(e.next(), 800.0);
        assert_eq!(e.current_page(), 3);

        e.go_to(2);
        assert_eq!(e.next(), 800.0);
        assert_eq!(e.prev(), 400.0);
        assert_eq!(e.current_page(), 2);
    }

    #[test]
    fn test_invalidate_marks_stale_without_recomputing() {
        let mut e = engine(400.0);
        e.measure(&FixedSurface {
            height: Some(1000.0),
            offset: 0.0,
        });
        assert!(!e.needs_measure());
        e.invalidate();
        assert!(e.needs_measure());
        assert_eq!(e.page_count(), 3); // stale values remain until remeasured
    }

    #[test]
    fn test_default_config_is_a4() {
        let config = default_page_config();
        assert!((config.page_height - A4_PAGE_HEIGHT_PX).abs() < f32::EPSILON);
    }
}
