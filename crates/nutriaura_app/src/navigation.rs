//! Screen stack and per-screen navigation metadata.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    Welcome,
    Camera,
    ConfirmPhoto,
    Quiz,
    Analyzing,
    Results,
    Forum,
    Progress,
    Quests,
    Profile,
    AlgorithmInfo,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenMeta {
    pub shows_back_button: bool,
    /// Entered from the persistent header; always replaces the history.
    pub is_lateral_tab: bool,
}

impl Screen {
    pub const TABS: [Screen; 4] = [Screen::Profile, Screen::Quests, Screen::Progress, Screen::Forum];

    pub fn meta(&self) -> ScreenMeta {
        let (shows_back_button, is_lateral_tab) = match self {
            Screen::Welcome => (false, false),
            Screen::Camera
            | Screen::ConfirmPhoto
            | Screen::Quiz
            | Screen::Analyzing
            | Screen::Results
            | Screen::AlgorithmInfo
            | Screen::Error => (true, false),
            Screen::Forum | Screen::Progress | Screen::Quests | Screen::Profile => (true, true),
        };
        ScreenMeta {
            shows_back_button,
            is_lateral_tab,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Frame {
    screen: Screen,
    entry: u64,
}

/// Ordered stack of visited screens; never empty.
///
/// Every push or reset creates a frame with a fresh entry id, so two visits
/// of the same screen are distinguishable.
#[derive(Clone, Debug)]
pub struct NavigationStack {
    frames: Vec<Frame>,
    next_entry: u64,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(Screen::Welcome)
    }
}

impl NavigationStack {
    pub fn new(root: Screen) -> Self {
        Self {
            frames: vec![Frame {
                screen: root,
                entry: 0,
            }],
            next_entry: 1,
        }
    }

    fn frame(&mut self, screen: Screen) -> Frame {
        let entry = self.next_entry;
        self.next_entry += 1;
        Frame { screen, entry }
    }

    pub fn push(&mut self, screen: Screen) {
        let frame = self.frame(screen);
        self.frames.push(frame);
    }

    /// Remove the top frame unless it is the root. Returns the removed screen.
    pub fn pop(&mut self) -> Option<Screen> {
        if self.frames.len() > 1 {
            self.frames.pop().map(|f| f.screen)
        } else {
            None
        }
    }

    pub fn reset_to(&mut self, screen: Screen) {
        let frame = self.frame(screen);
        self.frames.clear();
        self.frames.push(frame);
    }

    fn top(&self) -> &Frame {
        // non-empty: every mutation leaves at least one frame
        &self.frames[self.frames.len() - 1]
    }

    pub fn current(&self) -> Screen {
        self.top().screen
    }

    /// Identity of the current visit of the top screen.
    pub fn current_entry(&self) -> u64 {
        self.top().entry
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn screens(&self) -> Vec<Screen> {
        self.frames.iter().map(|f| f.screen).collect()
    }

    pub fn shows_back_button(&self) -> bool {
        self.frames.len() > 1 && self.current().meta().shows_back_button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_grow_the_stack_by_one_each() {
        let mut nav = NavigationStack::default();
        let pushes = [Screen::Camera, Screen::ConfirmPhoto, Screen::Quiz, Screen::Quiz];
        for (i, screen) in pushes.iter().enumerate() {
            nav.push(*screen);
            assert_eq!(nav.len(), i + 2);
            assert_eq!(nav.current(), *screen);
        }
    }

    #[test]
    fn pop_removes_exactly_one_frame() {
        let mut nav = NavigationStack::default();
        nav.push(Screen::Camera);
        nav.push(Screen::ConfirmPhoto);
        assert_eq!(nav.pop(), Some(Screen::ConfirmPhoto));
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.pop(), Some(Screen::Camera));
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.pop(), None);
        assert_eq!(nav.screens(), vec![Screen::Welcome]);
    }

    #[test]
    fn reset_replaces_everything() {
        let mut nav = NavigationStack::default();
        nav.push(Screen::Camera);
        nav.push(Screen::Quiz);
        nav.reset_to(Screen::Analyzing);
        assert_eq!(nav.screens(), vec![Screen::Analyzing]);
        nav.reset_to(Screen::Analyzing);
        assert_eq!(nav.screens(), vec![Screen::Analyzing]);
    }

    #[test]
    fn entries_differ_between_visits() {
        let mut nav = NavigationStack::default();
        nav.reset_to(Screen::Analyzing);
        let first = nav.current_entry();
        nav.reset_to(Screen::Analyzing);
        assert_ne!(first, nav.current_entry());

        nav.push(Screen::Camera);
        let camera = nav.current_entry();
        nav.push(Screen::Quiz);
        nav.pop();
        assert_eq!(nav.current_entry(), camera);
    }

    #[test]
    fn back_button_rules() {
        let mut nav = NavigationStack::default();
        assert!(!nav.shows_back_button());
        nav.push(Screen::Camera);
        assert!(nav.shows_back_button());
        nav.push(Screen::Welcome);
        assert!(!nav.shows_back_button());
        nav.reset_to(Screen::Results);
        assert!(!nav.shows_back_button());
    }

    #[test]
    fn tabs_are_lateral() {
        for tab in Screen::TABS {
            assert!(tab.meta().is_lateral_tab);
        }
        assert!(!Screen::Quiz.meta().is_lateral_tab);
        assert!(!Screen::Welcome.meta().shows_back_button);
    }
}
