use super::store::NodeGraphStore;
use super::types::PointerEvent;

/// Drag state machine fed by surface-relative pointer commands.
///
/// At most one node drags at a time; the session is keyed by node id so a
/// reconcile that removes the node mid-drag just turns the remaining moves
/// into no-ops.
#[derive(Debug, Default)]
pub struct InputController {
	dragging: Option<String>,
}

impl InputController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn dragging(&self) -> Option<&str> {
		self.dragging.as_deref()
	}

	/// Apply one pointer command. Surface-leave is reported as [`PointerEvent::Up`]
	/// by the caller.
	pub fn handle(&mut self, event: PointerEvent, store: &mut NodeGraphStore) {
		match event {
			PointerEvent::Down { x, y } => {
				if self.dragging.is_some() {
					return;
				}
				if let Some(idx) = store.node_at(x, y) {
					self.dragging = store.begin_drag(idx);
				}
			}
			PointerEvent::Move { x, y } => {
				if let Some(id) = &self.dragging {
					store.update_drag(id, x, y);
				}
			}
			PointerEvent::Up => {
				if let Some(id) = self.dragging.take() {
					store.end_drag(&id);
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::super::types::PeerStatus;
	use super::*;

	fn store_with_self() -> NodeGraphStore {
		let mut store = NodeGraphStore::new(200.0, 200.0);
		let mut rng = StdRng::seed_from_u64(11);
		store.reconcile(
			&[PeerStatus {
				address: "10.0.0.1:6746".into(),
				is_connected: true,
			}],
			&mut rng,
		);
		store
	}

	#[test]
	fn down_move_up_drags_and_releases() {
		let mut store = store_with_self();
		let mut input = InputController::new();

		// Self node sits at the center.
		input.handle(PointerEvent::Down { x: 105.0, y: 95.0 }, &mut store);
		assert_eq!(input.dragging(), Some("self"));
		assert!(store.nodes()[0].dragged);

		input.handle(PointerEvent::Move { x: 50.0, y: 60.0 }, &mut store);
		assert_eq!((store.nodes()[0].x, store.nodes()[0].y), (50.0, 60.0));
		assert_eq!((store.nodes()[0].vx, store.nodes()[0].vy), (0.0, 0.0));

		input.handle(PointerEvent::Up, &mut store);
		assert_eq!(input.dragging(), None);
		assert!(!store.nodes()[0].dragged);
		// Soft release: still at rest where it was dropped.
		assert_eq!((store.nodes()[0].vx, store.nodes()[0].vy), (0.0, 0.0));
	}

	#[test]
	fn down_outside_grab_radius_is_ignored() {
		let mut store = store_with_self();
		let mut input = InputController::new();

		input.handle(PointerEvent::Down { x: 5.0, y: 5.0 }, &mut store);
		assert_eq!(input.dragging(), None);

		// Moves without an active drag do nothing.
		input.handle(PointerEvent::Move { x: 50.0, y: 60.0 }, &mut store);
		assert_eq!(store.nodes()[0].x, 100.0);
	}

	#[test]
	fn second_down_does_not_steal_the_drag() {
		let mut store = store_with_self();
		let mut input = InputController::new();
		let peer_pos = (store.nodes()[1].x, store.nodes()[1].y);

		input.handle(PointerEvent::Down { x: 100.0, y: 100.0 }, &mut store);
		input.handle(
			PointerEvent::Down {
				x: peer_pos.0,
				y: peer_pos.1,
			},
			&mut store,
		);

		assert_eq!(input.dragging(), Some("self"));
		assert!(!store.nodes()[1].dragged);
	}

	#[test]
	fn drag_survives_roster_removal_without_panicking() {
		let mut store = store_with_self();
		let mut input = InputController::new();
		let peer_pos = (store.nodes()[1].x, store.nodes()[1].y);

		input.handle(
			PointerEvent::Down {
				x: peer_pos.0,
				y: peer_pos.1,
			},
			&mut store,
		);
		assert_eq!(input.dragging(), Some("10.0.0.1:6746"));

		// Peer drops off the roster mid-drag.
		let mut rng = StdRng::seed_from_u64(12);
		store.reconcile(&[], &mut rng);

		input.handle(PointerEvent::Move { x: 10.0, y: 10.0 }, &mut store);
		input.handle(PointerEvent::Up, &mut store);
		assert_eq!(input.dragging(), None);
	}
}
