use gloo_timers::callback::Timeout;

/// Slot for at most one pending timer. Arming replaces the previous timer and
/// cancelling empties the slot; either way the old timer is dropped, which
/// clears it and frees its callback.
pub struct OneShot<T = Timeout> {
	pending: Option<T>,
}

impl<T> Default for OneShot<T> {
	fn default() -> Self {
		Self { pending: None }
	}
}

impl<T> OneShot<T> {
	pub fn arm(&mut self, timer: T) {
		self.pending = Some(timer);
	}

	pub fn cancel(&mut self) {
		self.pending = None;
	}
}

impl OneShot {
	/// Runs `fire` after `millis` unless re-armed or cancelled first.
	pub fn after(&mut self, millis: u32, fire: impl FnOnce() + 'static) {
		self.arm(Timeout::new(millis, fire));
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	struct Counted(Rc<Cell<u32>>);

	impl Drop for Counted {
		fn drop(&mut self) {
			self.0.set(self.0.get() + 1);
		}
	}

	#[test]
	fn rearming_releases_the_previous_timer() {
		let dropped = Rc::new(Cell::new(0));
		let mut slot = OneShot::default();
		slot.arm(Counted(dropped.clone()));
		assert_eq!(dropped.get(), 0);
		slot.arm(Counted(dropped.clone()));
		assert_eq!(dropped.get(), 1);
		slot.cancel();
		assert_eq!(dropped.get(), 2);
		slot.cancel();
		assert_eq!(dropped.get(), 2);
	}

	#[test]
	fn dropping_the_slot_releases_its_timer() {
		let dropped = Rc::new(Cell::new(0));
		let mut slot = OneShot::default();
		slot.arm(Counted(dropped.clone()));
		drop(slot);
		assert_eq!(dropped.get(), 1);
	}
}
