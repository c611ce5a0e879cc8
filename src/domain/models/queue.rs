use std::collections::VecDeque;

use super::directive::Directive;

/// Strict FIFO queue of directives produced by one model turn.
///
/// Owned by the step executor. An aborted queue is drained completely and
/// never resumed.
///
/// # Examples
///
/// ```
/// use sprintpilot::domain::models::{Args, Directive, StepQueue};
///
/// let mut queue = StepQueue::new();
/// queue.load(vec![
///     Directive::new("create-task", Args::new()),
///     Directive::new("create-subtask", Args::new()),
/// ]);
///
/// assert_eq!(queue.pop().map(|d| d.tool), Some("create-task".to_string()));
/// assert_eq!(queue.drain(), 1);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepQueue {
    items: VecDeque<Directive>,
}

impl StepQueue {
    /// Creates a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents with `directives`, preserving their order.
    pub fn load(&mut self, directives: Vec<Directive>) {
        self.items = directives.into();
    }

    /// Removes and returns the head directive
    pub fn pop(&mut self) -> Option<Directive> {
        self.items.pop_front()
    }

    /// Discard every remaining directive, returning how many were dropped.
    pub fn drain(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Values carried from one directive to the next within a single queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossStepContext {
    /// Id of the task created by the most recent verified `create-task`.
    pub last_created_task_id: Option<String>,
}

impl CrossStepContext {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::directive::Args;

    fn directive(tool: &str) -> Directive {
        Directive::new(tool, Args::new())
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = StepQueue::new();
        queue.load(vec![directive("a"), directive("b"), directive("c")]);
        let order: Vec<String> = std::iter::from_fn(|| queue.pop()).map(|d| d.tool).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_replaces_previous_contents() {
        let mut queue = StepQueue::new();
        queue.load(vec![directive("a"), directive("b")]);
        queue.load(vec![directive("c")]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().map(|d| d.tool), Some("c".to_string()));
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = StepQueue::new();
        queue.load(vec![directive("a"), directive("b")]);
        assert_eq!(queue.drain(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn test_context_reset() {
        let mut ctx = CrossStepContext {
            last_created_task_id: Some("abc".to_string()),
        };
        ctx.reset();
        assert_eq!(ctx, CrossStepContext::default());
    }
}
