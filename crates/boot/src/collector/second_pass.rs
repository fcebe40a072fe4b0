use std::collections::VecDeque;
use std::fmt;

use crate::collector::InFlightMetadataCollector;
use crate::{BuildError, Result};

/// A binding step deferred until the whole tabular model exists.
pub type SecondPass = Box<dyn FnOnce(&mut InFlightMetadataCollector) -> Result<()>>;

/// FIFO queue of deferred steps.
///
/// Steps must not enqueue further steps: a push while the queue drains fails
/// with [`BuildError::RecursiveSecondPass`].
#[derive(Default)]
pub(crate) struct SecondPassQueue {
	queue: VecDeque<(String, SecondPass)>,
	draining: bool,
}

impl SecondPassQueue {
	pub(crate) fn push(&mut self, label: String, pass: SecondPass) -> Result<()> {
		if self.draining {
			return Err(BuildError::RecursiveSecondPass { label });
		}
		self.queue.push_back((label, pass));
		Ok(())
	}

	pub(crate) fn begin_drain(&mut self) -> VecDeque<(String, SecondPass)> {
		self.draining = true;
		std::mem::take(&mut self.queue)
	}

	pub(crate) fn end_drain(&mut self) {
		self.draining = false;
	}

	pub(crate) fn len(&self) -> usize {
		self.queue.len()
	}
}

impl fmt::Debug for SecondPassQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SecondPassQueue")
			.field("pending", &self.queue.iter().map(|(label, _)| label).collect::<Vec<_>>())
			.field("draining", &self.draining)
			.finish()
	}
}
