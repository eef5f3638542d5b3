
use crate::Selector;

/// Replays a fixed list of indices, wrapping around at the end.
pub(crate) struct ScriptedSelector {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedSelector {
    pub(crate) fn new(script: Vec<usize>) -> Self {
        assert!(!script.is_empty(), "script needs at least one index");
        Self { script, cursor: 0 }
    }
}

impl Selector for ScriptedSelector {
    fn pick(&mut self, bound: usize) -> usize {
        let i = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        assert!(i < bound, "scripted index {i} out of bounds {bound}");
        i
    }
}
