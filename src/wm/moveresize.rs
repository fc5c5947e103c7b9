//! MoveResize Module
//!
//! Pointer gestures on a container: button 1 moves it, button 3 resizes it
//! together with the client inside. A button 1 press and release without
//! motion in between is a click and focuses the window.
//!
//! All pointer positions are in root coordinates, so moving the container
//! under the pointer does not disturb the deltas.

use tracing::{debug, trace};
use x11rb::protocol::xproto::{Timestamp, Window};

use crate::shared::Point;
use crate::wm::client::{DragState, Gesture, ResizeState};
use crate::wm::conn::{Result, WindowChanges, XConn};
use crate::wm::{WindowManager, WmError};

const MOVE_BUTTON: u8 = 1;
const RESIZE_BUTTON: u8 = 3;

/// `start + delta`, kept within `min..=u16::MAX`, the largest size the
/// server accepts.
fn resized(start: u32, delta: i32, min: u32) -> u32 {
    let max = i64::from(u16::MAX);
    let size = i64::from(start) + i64::from(delta);
    size.clamp(i64::from(min.max(1)).min(max), max) as u32
}

impl<C: XConn> WindowManager<C> {
    /// Start a move or resize on the window owning `id`. A press while
    /// another gesture is in progress is ignored.
    pub(crate) fn begin_gesture(&mut self, id: Window, button: u8, pointer: Point) -> Result<()> {
        let Some(window) = self.registry.lookup(id) else {
            return Err(WmError::UnknownWindow(id));
        };
        if !window.gesture.is_idle() {
            debug!(
                "Ignoring button {} on 0x{:x}: {:?} in progress",
                button, window.target, window.gesture
            );
            return Ok(());
        }
        if button != MOVE_BUTTON && button != RESIZE_BUTTON {
            return Ok(());
        }

        let container = window.container;
        if button == MOVE_BUTTON {
            self.focus.raise(&self.conn, container)?;
        }
        let geometry = self.container_geometry(window)?;

        let gesture = if button == MOVE_BUTTON {
            Gesture::Dragging(DragState {
                moved: false,
                anchor: pointer,
                origin: geometry.position(),
            })
        } else {
            Gesture::Resizing(ResizeState {
                anchor: pointer,
                start_width: geometry.width,
                start_height: geometry.height,
            })
        };
        debug!("Container 0x{:x}: {:?}", container, gesture);

        if let Some(window) = self.registry.lookup_mut(container) {
            window.geometry = geometry;
            window.gesture = gesture;
        }
        Ok(())
    }

    /// Apply pointer motion to the gesture in progress on `id`, if any.
    pub(crate) fn update_gesture(&mut self, id: Window, pointer: Point) -> Result<()> {
        let min_width = self.behavior.min_width;
        let min_height = self.behavior.min_height;
        let Some(window) = self.registry.lookup_mut(id) else {
            return Err(WmError::UnknownWindow(id));
        };

        match window.gesture {
            Gesture::Idle => Ok(()),
            Gesture::Dragging(mut drag) => {
                let (dx, dy) = pointer.delta_from(drag.anchor);
                drag.anchor = pointer;
                drag.moved = true;

                let position = window.geometry.position().offset(dx, dy);
                window.geometry.x = position.x;
                window.geometry.y = position.y;
                window.gesture = Gesture::Dragging(drag);
                trace!("Moving 0x{:x} to ({}, {})", window.container, position.x, position.y);

                self.conn.configure_window(
                    window.container,
                    &WindowChanges::new().position(position.x, position.y),
                )
            }
            Gesture::Resizing(resize) => {
                let (dx, dy) = pointer.delta_from(resize.anchor);
                let width = resized(resize.start_width, dx, min_width);
                let height = resized(resize.start_height, dy, min_height);

                window.geometry.width = width;
                window.geometry.height = height;
                trace!("Resizing 0x{:x} to {}x{}", window.container, width, height);

                let size = WindowChanges::new().size(width, height);
                self.conn.configure_window(window.container, &size)?;
                self.conn.configure_window(window.target, &size)
            }
        }
    }

    /// Finish the gesture `button` started on `id`. A release of the other
    /// button leaves the gesture running.
    pub(crate) fn end_gesture(&mut self, id: Window, button: u8, time: Timestamp) -> Result<()> {
        let Some(window) = self.registry.lookup_mut(id) else {
            return Err(WmError::UnknownWindow(id));
        };

        match (button, window.gesture) {
            (MOVE_BUTTON, Gesture::Dragging(drag)) => {
                window.gesture = Gesture::Idle;
                let container = window.container;
                if drag.moved {
                    let position = window.last_position();
                    debug!(
                        "Moved 0x{:x} from ({}, {}) to ({}, {})",
                        container, drag.origin.x, drag.origin.y, position.x, position.y
                    );
                    Ok(())
                } else {
                    self.focus
                        .set_focus(&self.conn, &self.registry, &self.style, container, time)
                }
            }
            (RESIZE_BUTTON, Gesture::Resizing(_)) => {
                window.gesture = Gesture::Idle;
                debug!(
                    "Resized 0x{:x} to {}x{}",
                    window.container, window.geometry.width, window.geometry.height
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::shared::Geometry;
    use crate::wm::testing::{FakeX, Request};
    use crate::wm::Adoption;

    const TARGET: Window = 0x400001;

    fn adopted(geometry: Geometry) -> (WindowManager<FakeX>, Window) {
        adopted_with(Config::default(), geometry)
    }

    fn adopted_with(config: Config, geometry: Geometry) -> (WindowManager<FakeX>, Window) {
        let x = FakeX::new();
        x.add_client(TARGET, geometry);
        let mut wm = WindowManager::new(x, &config.window_manager).unwrap();
        let Adoption::Adopted { container } = wm.try_adopt(TARGET).unwrap() else {
            panic!("window was not adopted");
        };
        wm.conn().clear_requests();
        (wm, container)
    }

    fn gesture(wm: &WindowManager<FakeX>) -> Gesture {
        wm.registry().by_target(TARGET).unwrap().gesture
    }

    #[test]
    fn resized_clamps_to_minimum() {
        assert_eq!(resized(400, 20, 1), 420);
        assert_eq!(resized(400, -500, 1), 1);
        assert_eq!(resized(400, -395, 10), 10);
        assert_eq!(resized(10, -10, 0), 1);
        assert_eq!(resized(65000, 2000, 1), 65535);
        assert_eq!(resized(u32::MAX, 5, 1), 65535);
        assert_eq!(resized(400, 20, 70000), 65535);
    }

    #[test]
    fn drag_accumulates_incremental_deltas() {
        let (mut wm, container) = adopted(Geometry::new(50, 50, 200, 100));

        wm.begin_gesture(container, 1, Point::new(100, 100)).unwrap();
        wm.update_gesture(container, Point::new(130, 115)).unwrap();
        wm.update_gesture(container, Point::new(140, 90)).unwrap();

        let Gesture::Dragging(drag) = gesture(&wm) else {
            panic!("not dragging");
        };
        assert!(drag.moved);
        assert_eq!(drag.anchor, Point::new(140, 90));
        assert_eq!(drag.origin, Point::new(50, 50));
        assert_eq!(
            wm.registry().by_target(TARGET).unwrap().last_position(),
            Point::new(90, 40)
        );
        assert_eq!(
            wm.conn().requests().last(),
            Some(&Request::ConfigureWindow(container, WindowChanges::new().position(90, 40)))
        );
    }

    #[test]
    fn press_raises_before_dragging() {
        let (mut wm, container) = adopted(Geometry::new(50, 50, 200, 100));

        wm.begin_gesture(container, 1, Point::new(60, 60)).unwrap();
        assert_eq!(
            wm.conn().requests(),
            vec![Request::ConfigureWindow(container, WindowChanges::new().raise())]
        );
    }

    #[test]
    fn resize_uses_delta_from_press() {
        let (mut wm, container) = adopted(Geometry::new(0, 0, 400, 300));

        wm.begin_gesture(container, 3, Point::new(400, 300)).unwrap();
        wm.update_gesture(container, Point::new(410, 295)).unwrap();
        wm.update_gesture(container, Point::new(420, 290)).unwrap();

        let size = WindowChanges::new().size(420, 290);
        let requests = wm.conn().requests();
        assert_eq!(
            requests[requests.len() - 2..],
            [
                Request::ConfigureWindow(container, size),
                Request::ConfigureWindow(TARGET, size)
            ]
        );
        let geometry = wm.registry().by_target(TARGET).unwrap().geometry;
        assert_eq!((geometry.width, geometry.height), (420, 290));
        assert_eq!(geometry.position(), Point::new(0, 0));
    }

    #[test]
    fn resize_never_goes_below_the_minimum() {
        let mut config = Config::default();
        config.window_manager.behavior.min_width = 50;
        config.window_manager.behavior.min_height = 40;
        let (mut wm, container) = adopted_with(config, Geometry::new(0, 0, 400, 300));

        wm.begin_gesture(container, 3, Point::new(500, 500)).unwrap();
        wm.update_gesture(container, Point::new(-1000, -1000)).unwrap();

        assert_eq!(wm.conn().geometry(container).map(|g| (g.width, g.height)), Some((50, 40)));
        assert_eq!(wm.conn().geometry(TARGET).map(|g| (g.width, g.height)), Some((50, 40)));
    }

    #[test]
    fn resize_stops_at_the_largest_window_size() {
        let (mut wm, container) = adopted(Geometry::new(0, 0, 65000, 100));

        wm.begin_gesture(container, 3, Point::new(0, 0)).unwrap();
        wm.update_gesture(container, Point::new(2000, 0)).unwrap();

        let size = WindowChanges::new().size(65535, 100);
        let requests = wm.conn().requests();
        assert_eq!(
            requests[requests.len() - 2..],
            [
                Request::ConfigureWindow(container, size),
                Request::ConfigureWindow(TARGET, size)
            ]
        );
        let geometry = wm.registry().by_target(TARGET).unwrap().geometry;
        assert_eq!((geometry.width, geometry.height), (65535, 100));
    }

    #[test]
    fn click_focuses_without_moving() {
        let (mut wm, container) = adopted(Geometry::new(50, 50, 200, 100));

        wm.begin_gesture(container, 1, Point::new(60, 60)).unwrap();
        wm.end_gesture(container, 1, 5).unwrap();

        assert!(gesture(&wm).is_idle());
        assert_eq!(wm.focused(), Some(TARGET));
        assert_eq!(wm.conn().geometry(container).map(|g| g.position()), Some(Point::new(50, 50)));
        assert!(!wm
            .conn()
            .requests()
            .iter()
            .any(|r| matches!(r, Request::ConfigureWindow(_, c) if c.x.is_some())));
    }

    #[test]
    fn drag_release_does_not_focus() {
        let (mut wm, container) = adopted(Geometry::new(50, 50, 200, 100));

        wm.begin_gesture(container, 1, Point::new(60, 60)).unwrap();
        wm.update_gesture(container, Point::new(61, 60)).unwrap();
        wm.end_gesture(container, 1, 5).unwrap();

        assert!(gesture(&wm).is_idle());
        assert_eq!(wm.focused(), None);
    }

    #[test]
    fn resize_press_during_drag_is_ignored() {
        let (mut wm, container) = adopted(Geometry::new(50, 50, 200, 100));

        wm.begin_gesture(container, 1, Point::new(100, 100)).unwrap();
        wm.update_gesture(container, Point::new(110, 100)).unwrap();
        let before = gesture(&wm);

        wm.begin_gesture(container, 3, Point::new(110, 100)).unwrap();
        assert_eq!(gesture(&wm), before);

        // Releasing the button that was ignored does not end the drag.
        wm.end_gesture(container, 3, 5).unwrap();
        assert_eq!(gesture(&wm), before);

        wm.update_gesture(container, Point::new(120, 100)).unwrap();
        assert_eq!(wm.conn().geometry(container).map(|g| g.position()), Some(Point::new(70, 50)));

        wm.end_gesture(container, 1, 6).unwrap();
        assert!(gesture(&wm).is_idle());
    }

    #[test]
    fn drag_press_during_resize_is_ignored() {
        let (mut wm, container) = adopted(Geometry::new(0, 0, 400, 300));

        wm.begin_gesture(container, 3, Point::new(400, 300)).unwrap();
        wm.conn().clear_requests();
        wm.begin_gesture(container, 1, Point::new(400, 300)).unwrap();

        assert!(matches!(gesture(&wm), Gesture::Resizing(_)));
        assert!(wm.conn().requests().is_empty());
    }

    #[test]
    fn motion_without_gesture_does_nothing() {
        let (mut wm, container) = adopted(Geometry::new(0, 0, 400, 300));

        wm.update_gesture(container, Point::new(10, 10)).unwrap();
        wm.end_gesture(container, 1, 0).unwrap();
        assert!(wm.conn().requests().is_empty());
    }

    #[test]
    fn unknown_windows_are_reported() {
        let (mut wm, _) = adopted(Geometry::new(0, 0, 400, 300));

        assert!(matches!(
            wm.update_gesture(0x999, Point::new(0, 0)),
            Err(WmError::UnknownWindow(0x999))
        ));
        assert!(matches!(
            wm.end_gesture(0x999, 1, 0),
            Err(WmError::UnknownWindow(0x999))
        ));
    }

    #[test]
    fn gestures_may_target_either_id() {
        let (mut wm, _) = adopted(Geometry::new(0, 0, 400, 300));

        wm.begin_gesture(TARGET, 3, Point::new(0, 0)).unwrap();
        assert!(matches!(gesture(&wm), Gesture::Resizing(_)));
    }

    #[test]
    fn start_geometry_falls_back_to_cache() {
        let (mut wm, container) = adopted(Geometry::new(5, 6, 400, 300));
        wm.conn().fail("GetGeometry");

        wm.begin_gesture(container, 1, Point::new(0, 0)).unwrap();
        let Gesture::Dragging(drag) = gesture(&wm) else {
            panic!("not dragging");
        };
        assert_eq!(drag.origin, Point::new(5, 6));
    }
}
