//! Map state: a single moving marker and the view that follows it.

use chrono::{DateTime, Local};

use super::reading::Gps;

/// The visible map region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
}

impl MapView {
    pub const MIN_ZOOM: u8 = 1;
    pub const MAX_ZOOM: u8 = 18;

    /// Half extents in degrees `(lat, lon)` covered at the current zoom.
    pub fn half_extent(&self) -> (f64, f64) {
        let lon = 180.0 / 2f64.powi(self.zoom as i32);
        (lon / 2.0, lon)
    }

    /// `[min, max]` longitude bounds (x axis).
    pub fn x_bounds(&self) -> [f64; 2] {
        let (_, half) = self.half_extent();
        [self.center.1 - half, self.center.1 + half]
    }

    /// `[min, max]` latitude bounds (y axis).
    pub fn y_bounds(&self) -> [f64; 2] {
        let (half, _) = self.half_extent();
        [self.center.0 - half, self.center.0 + half]
    }
}

/// Popup details bound to the marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub latitude: f64,
    pub longitude: f64,
    pub updated: DateTime<Local>,
}

/// What a position update did to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapUpdate {
    /// No usable fix; nothing changed.
    Ignored,
    /// First fix: marker created, view centered and zoomed, popup opened.
    Placed,
    /// Marker moved and view panned; zoom untouched.
    Moved,
}

/// Owns the one marker of the session.
#[derive(Debug, Clone)]
pub struct MapSink {
    view: MapView,
    fix_zoom: u8,
    marker: Option<(f64, f64)>,
    popup: Option<Popup>,
    popup_open: bool,
    auto_opened: bool,
}

impl MapSink {
    /// Create a map showing `center` at `initial_zoom`; the first fix zooms to `fix_zoom`.
    pub fn new(center: (f64, f64), initial_zoom: u8, fix_zoom: u8) -> Self {
        Self {
            view: MapView {
                center,
                zoom: initial_zoom.clamp(MapView::MIN_ZOOM, MapView::MAX_ZOOM),
            },
            fix_zoom: fix_zoom.clamp(MapView::MIN_ZOOM, MapView::MAX_ZOOM),
            marker: None,
            popup: None,
            popup_open: false,
            auto_opened: false,
        }
    }

    /// Move the marker to the latest fix.
    ///
    /// Requires both coordinates. The popup opens automatically only once per
    /// session; afterwards its content is refreshed but its visibility is left
    /// to the user.
    pub fn update_position(&mut self, gps: Option<&Gps>, now: DateTime<Local>) -> MapUpdate {
        let Some((latitude, longitude)) = gps.and_then(Gps::fix) else {
            return MapUpdate::Ignored;
        };

        let update = if self.marker.is_some() {
            self.view.center = (latitude, longitude);
            MapUpdate::Moved
        } else {
            self.view = MapView {
                center: (latitude, longitude),
                zoom: self.fix_zoom,
            };
            MapUpdate::Placed
        };

        self.marker = Some((latitude, longitude));
        self.popup = Some(Popup {
            latitude,
            longitude,
            updated: now,
        });

        if !self.auto_opened {
            self.popup_open = true;
            self.auto_opened = true;
        }

        update
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn marker(&self) -> Option<(f64, f64)> {
        self.marker
    }

    /// The popup, if it is currently open.
    pub fn popup(&self) -> Option<&Popup> {
        if self.popup_open {
            self.popup.as_ref()
        } else {
            None
        }
    }

    pub fn toggle_popup(&mut self) {
        if self.popup.is_some() {
            self.popup_open = !self.popup_open;
        }
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom = (self.view.zoom + 1).min(MapView::MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom = self.view.zoom.saturating_sub(1).max(MapView::MIN_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> MapSink {
        MapSink::new((-16.3989, -71.537), 14, 15)
    }

    #[test]
    fn test_missing_fix_is_ignored() {
        let mut map = sink();
        let now = Local::now();
        assert_eq!(map.update_position(None, now), MapUpdate::Ignored);
        assert_eq!(map.update_position(Some(&Gps::default()), now), MapUpdate::Ignored);
        let partial = Gps {
            latitude: Some(1.0),
            longitude: None,
        };
        assert_eq!(map.update_position(Some(&partial), now), MapUpdate::Ignored);
        assert!(map.marker().is_none());
        assert!(map.popup().is_none());
        assert_eq!(map.view().zoom, 14);
    }

    #[test]
    fn test_first_fix_places_marker_and_opens_popup() {
        let mut map = sink();
        let update = map.update_position(Some(&Gps::new(10.0, 20.0)), Local::now());
        assert_eq!(update, MapUpdate::Placed);
        assert_eq!(map.marker(), Some((10.0, 20.0)));
        assert_eq!(map.view().center, (10.0, 20.0));
        assert_eq!(map.view().zoom, 15);
        assert_eq!(map.popup().map(|p| p.latitude), Some(10.0));
    }

    #[test]
    fn test_later_fixes_pan_without_resetting_zoom() {
        let mut map = sink();
        map.update_position(Some(&Gps::new(10.0, 20.0)), Local::now());
        map.zoom_out();
        map.zoom_out();

        let update = map.update_position(Some(&Gps::new(11.0, 21.0)), Local::now());
        assert_eq!(update, MapUpdate::Moved);
        assert_eq!(map.marker(), Some((11.0, 21.0)));
        assert_eq!(map.view().center, (11.0, 21.0));
        assert_eq!(map.view().zoom, 13);
    }

    #[test]
    fn test_popup_opens_automatically_only_once() {
        let mut map = sink();
        map.update_position(Some(&Gps::new(1.0, 1.0)), Local::now());
        map.toggle_popup();
        assert!(map.popup().is_none());

        map.update_position(Some(&Gps::new(2.0, 2.0)), Local::now());
        assert!(map.popup().is_none());

        map.toggle_popup();
        assert_eq!(map.popup().map(|p| p.longitude), Some(2.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut map = MapSink::new((0.0, 0.0), 1, 18);
        map.zoom_out();
        assert_eq!(map.view().zoom, MapView::MIN_ZOOM);
        map.update_position(Some(&Gps::new(0.0, 0.0)), Local::now());
        map.zoom_in();
        assert_eq!(map.view().zoom, MapView::MAX_ZOOM);
    }

    #[test]
    fn test_bounds_follow_center() {
        let view = MapView {
            center: (10.0, 20.0),
            zoom: 1,
        };
        assert_eq!(view.x_bounds(), [-70.0, 110.0]);
        assert_eq!(view.y_bounds(), [-35.0, 55.0]);
    }
}
