/// Collects mono samples into fixed-size, non-overlapping analysis windows.
///
/// The buffer never holds more than `window_size` samples. When it fills,
/// the full window is handed out and the buffer is cleared; the remainder of
/// the input starts the next window.
#[derive(Debug)]
pub struct WindowAccumulator {
    buffer: Vec<f32>,
    window_size: usize,
}

impl WindowAccumulator {
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "window size must be positive");
        Self {
            buffer: Vec::with_capacity(window_size),
            window_size,
        }
    }

    /// Append `samples`, calling `on_window` once for every window completed.
    ///
    /// Returns the number of windows completed.
    pub fn push(&mut self, mut samples: &[f32], mut on_window: impl FnMut(&[f32])) -> usize {
        let mut completed = 0;
        while !samples.is_empty() {
            let take = (self.window_size - self.buffer.len()).min(samples.len());
            let (head, tail) = samples.split_at(take);
            self.buffer.extend_from_slice(head);
            samples = tail;

            if self.buffer.len() == self.window_size {
                on_window(&self.buffer);
                self.buffer.clear();
                completed += 1;
            }
        }
        completed
    }

    /// Samples waiting for the next window.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
