use shared::domain::Story;

/// Bounded cursor over the scenes of one story. The index is always in
/// `0..len`; operations that would leave that range do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNavigator {
    current: usize,
    len: usize,
}

impl SceneNavigator {
    /// `Story` is never empty, so the navigator always has a current scene.
    pub fn for_story(story: &Story) -> Self {
        Self {
            current: 0,
            len: story.len(),
        }
    }

    #[cfg(test)]
    fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self { current: 0, len })
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// 1-based position, for display.
    pub fn position(&self) -> usize {
        self.current + 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_at_start(&self) -> bool {
        self.current == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.current + 1 == self.len
    }

    pub fn next(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.is_at_start() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Out-of-range targets are rejected and leave the index unchanged.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.current = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Next,
        Previous,
        Jump(usize),
    }

    fn apply(navigator: &mut SceneNavigator, op: Op) {
        match op {
            Op::Next => {
                navigator.next();
            }
            Op::Previous => {
                navigator.previous();
            }
            Op::Jump(index) => {
                navigator.jump_to(index);
            }
        }
    }

    #[test]
    fn empty_sequence_has_no_navigator() {
        assert!(SceneNavigator::new(0).is_none());
    }

    #[test]
    fn story_navigator_covers_every_scene() {
        let scenes = (1..=3)
            .map(|i| shared::domain::Scene::new(format!("t{i}"), format!("{i}.png")))
            .collect();
        let story = Story::new("three scenes", scenes).expect("story");
        let navigator = SceneNavigator::for_story(&story);
        assert_eq!(navigator.len(), story.len());
        assert!(!navigator.is_empty());
        assert!(navigator.is_at_start());
    }

    #[test]
    fn walks_forward_and_stops_at_end() {
        let mut navigator = SceneNavigator::new(3).expect("navigator");
        assert_eq!(navigator.current_index(), 0);
        assert!(navigator.next());
        assert_eq!(navigator.current_index(), 1);
        assert!(navigator.next());
        assert_eq!(navigator.current_index(), 2);
        assert!(!navigator.next());
        assert_eq!(navigator.current_index(), 2);
        assert!(navigator.is_at_end());
    }

    #[test]
    fn previous_at_start_is_noop() {
        let mut navigator = SceneNavigator::new(2).expect("navigator");
        assert!(!navigator.previous());
        assert_eq!(navigator.current_index(), 0);
        assert!(navigator.is_at_start());
    }

    #[test]
    fn single_scene_is_both_start_and_end() {
        let mut navigator = SceneNavigator::new(1).expect("navigator");
        assert!(navigator.is_at_start());
        assert!(navigator.is_at_end());
        assert!(!navigator.next());
        assert!(!navigator.previous());
    }

    #[test]
    fn jump_rejects_out_of_range_targets() {
        let mut navigator = SceneNavigator::new(4).expect("navigator");
        assert!(navigator.jump_to(3));
        assert_eq!(navigator.current_index(), 3);
        assert!(!navigator.jump_to(4));
        assert!(!navigator.jump_to(usize::MAX));
        assert_eq!(navigator.current_index(), 3);
        assert!(navigator.jump_to(0));
        assert_eq!(navigator.position(), 1);
    }

    #[test]
    fn boundary_predicates_match_index_exactly() {
        let mut navigator = SceneNavigator::new(5).expect("navigator");
        for index in 0..5 {
            assert!(navigator.jump_to(index));
            assert_eq!(navigator.is_at_start(), index == 0);
            assert_eq!(navigator.is_at_end(), index == 4);
        }
    }

    #[test]
    fn index_stays_in_bounds_for_every_short_sequence() {
        const DEPTH: u32 = 5;
        for len in 1..=4usize {
            let ops = [
                Op::Next,
                Op::Previous,
                Op::Jump(0),
                Op::Jump(len - 1),
                Op::Jump(len),
            ];
            let combinations = ops.len().pow(DEPTH);
            for mut seed in 0..combinations {
                let mut navigator = SceneNavigator::new(len).expect("navigator");
                for _ in 0..DEPTH {
                    let op = ops[seed % ops.len()];
                    seed /= ops.len();
                    let before = navigator.current_index();
                    apply(&mut navigator, op);
                    let after = navigator.current_index();
                    assert!(after < len, "{op:?} moved {before} -> {after} (len {len})");
                    assert!(before.abs_diff(after) <= 1 || matches!(op, Op::Jump(_)));
                }
            }
        }
    }
}
